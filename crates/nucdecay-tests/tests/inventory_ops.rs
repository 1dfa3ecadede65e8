//! Inventory behaviour on the sample dataset.

use std::sync::Arc;

use nucdecay_core::{ActivityUnit, MassUnit, NuclideId, Prefix, QuantityUnit, TimeUnit};
use nucdecay_engine::{DatasetSpec, DecayDataset};
use nucdecay_inventory::{Inventory, InventoryError, Precision, SolverConfig, TimeGrid};
use nucdecay_tests::helpers::*;

fn mbq() -> QuantityUnit {
    ActivityUnit::Becquerel(Prefix::Mega).into()
}

#[test]
fn activity_round_trips_through_inventory() {
    let inv = Inventory::new(sample_dataset(), [("Tc-99m", 740.0)], mbq()).unwrap();
    let back = inv.get("Tc-99m", mbq()).unwrap();
    assert!(rel_err(back, 740.0) < 1e-12);
    let ci = inv.get("Tc-99m", "mCi".parse().unwrap()).unwrap();
    assert!(rel_err(ci, 20.0) < 1e-12);
}

#[test]
fn every_name_form_resolves() {
    let ds = sample_dataset();
    let canonical = id("Tc-99m").canonical();
    let inv = Inventory::new(ds.clone(), [("Tc-99m", 1.0), ("Tc99m", 1.0), ("99mTc", 1.0)], QuantityUnit::Atoms).unwrap();
    let by_id = Inventory::new(ds, [(canonical, 1.0)], QuantityUnit::Atoms).unwrap();
    assert_eq!(inv.atoms("Tc-99m").unwrap(), 3.0);
    assert_eq!(by_id.atoms("Tc-99m").unwrap(), 1.0);
}

#[test]
fn decay_adds_progeny_and_keeps_originals() {
    let inv = Inventory::new(sample_dataset(), [("Mo-99", 1e15), ("Ru-99", 0.0)], QuantityUnit::Atoms).unwrap();
    let out = inv.decay(1.0, TimeUnit::Day).unwrap();
    let names: Vec<String> = out.nuclides().iter().map(NuclideId::to_string).collect();
    assert_eq!(names, vec!["Mo-99", "Tc-99m", "Tc-99", "Ru-99"]);
    assert_eq!(inv.len(), 2);
    assert!(out.atoms("Tc-99m").unwrap() > 0.0);
}

#[test]
fn uranium_decay_populates_chain() {
    let inv = Inventory::new(sample_dataset(), [("U-238", 1.0)], MassUnit::Gram(Prefix::Kilo).into())
        .unwrap()
        .with_precision(Precision::High { sig_figs: 60 });
    let out = inv.decay(1e6, TimeUnit::Year).unwrap();
    assert!(out.len() >= 19);
    assert!(out.contains("Pb-206"));
    assert!(out.negative_nuclides().is_empty());
    let fractions = out.mass_fractions().unwrap();
    let total: f64 = fractions.iter().map(|(_, f)| f).sum();
    assert!(rel_err(total, 1.0) < 1e-12);
}

#[test]
fn subtraction_surfaces_negative_quantities() {
    let inv = Inventory::new(sample_dataset(), [("Cs-137", 1.0)], ActivityUnit::BQ.into()).unwrap();
    let over = inv.subtract([("Cs-137", 2.0)], ActivityUnit::BQ.into()).unwrap();
    assert_eq!(over.negative_nuclides(), vec![id("Cs-137")]);
    assert!(rel_err(over.get("Cs-137", ActivityUnit::BQ.into()).unwrap(), -1.0) < 1e-12);
}

#[test]
fn datasets_with_different_inputs_do_not_mix() {
    let mut spec = DatasetSpec::from_json(SAMPLE_JSON).unwrap();
    spec.year_days = 365.25;
    let julian = Arc::new(DecayDataset::from_spec(&spec).unwrap());
    let a = Inventory::new(sample_dataset(), [("H-3", 1.0)], QuantityUnit::Atoms).unwrap();
    let b = Inventory::new(julian, [("H-3", 1.0)], QuantityUnit::Atoms).unwrap();
    match a.add_inventory(&b) {
        Err(InventoryError::DatasetMismatch { left, right }) => {
            assert!(left.starts_with("sample"));
            assert!(right.starts_with("sample"));
            assert_ne!(left, right);
        }
        other => panic!("expected a dataset mismatch, got {other:?}"),
    }

    // Two loads of the same file are the same dataset.
    let c = Inventory::new(sample_dataset(), [("H-3", 2.0)], QuantityUnit::Atoms).unwrap();
    assert_eq!(a.add_inventory(&c).unwrap().atoms("H-3").unwrap(), 3.0);
}

#[test]
fn technetium_generator_peaks_near_a_day() {
    let inv = Inventory::new(sample_dataset(), [("Mo-99", 1e15)], QuantityUnit::Atoms).unwrap();
    let grid = TimeGrid::Uniform { duration: 48.0, samples: 97 };
    let table = inv.decay_series(&grid, TimeUnit::Hour, QuantityUnit::Atoms).unwrap();
    let tc = table.series("Tc-99m").unwrap();
    let (peak, _) = tc
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (k, v)| if *v > best.1 { (k, *v) } else { best });

    let ds = sample_dataset();
    let l1 = ds.nuclide("Mo-99").unwrap().decay_constant;
    let l2 = ds.nuclide("Tc-99m").unwrap().decay_constant;
    let t_max = (l2 / l1).ln() / (l2 - l1) / 3600.0;
    assert!((table.times()[peak] - t_max).abs() <= 0.5);
}

#[test]
fn config_selects_precision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nucdecay.toml");
    std::fs::write(&path, "high_precision = true\nsig_figs = 64\n").unwrap();
    let cfg = SolverConfig::load(Some(&path)).unwrap();
    let inv = Inventory::new(sample_dataset(), [("C-14", 1e12)], QuantityUnit::Atoms)
        .unwrap()
        .with_precision(cfg.precision());
    assert_eq!(inv.precision(), Precision::High { sig_figs: 64 });
    let out = inv.decay(5700.0, TimeUnit::Year).unwrap();
    assert!(rel_err(out.atoms("C-14").unwrap(), 5e11) < 1e-12);
}

#[test]
fn unknown_nuclide_is_reported() {
    let err = Inventory::new(sample_dataset(), [("I-131", 1.0)], QuantityUnit::Atoms).unwrap_err();
    assert!(err.to_string().contains("I-131"));
}

#[test]
fn display_names_dataset_and_precision() {
    let inv = Inventory::new(sample_dataset(), [("K-40", 2.0)], QuantityUnit::Atoms).unwrap();
    let text = inv.to_string();
    assert!(text.contains("dataset sample"));
    assert!(text.contains("K-40"));
}

#[test]
fn zero_decay_time_leaves_mixed_scales_untouched() {
    let start = [("Rn-222", 1e12), ("Pb-214", 5.0)];
    for precision in [Precision::Fixed, Precision::High { sig_figs: 40 }] {
        let inv = Inventory::new(sample_dataset(), start, QuantityUnit::Atoms)
            .unwrap()
            .with_precision(precision);
        let out = inv.decay(0.0, TimeUnit::Second).unwrap();
        assert_eq!(out.atoms("Rn-222").unwrap(), 1e12);
        assert_eq!(out.atoms("Pb-214").unwrap(), 5.0);
        assert!(out.negative_nuclides().is_empty());
    }
}

#[test]
fn decay_power_follows_tabulated_energies() {
    let ds = sample_dataset();
    let inv = Inventory::new(ds.clone(), [("Cs-137", 1e9), ("Rn-222", 1e6), ("C-14", 1e9)], ActivityUnit::BQ.into())
        .unwrap();
    let power: std::collections::HashMap<_, _> = inv.decay_power().into_iter().collect();
    let joule = nucdecay_core::constants::EV_TO_JOULE;
    assert!(rel_err(power[&id("Cs-137")], 1e9 * 1_175_630.0 * joule) < 1e-12);
    assert!(rel_err(power[&id("Rn-222")], 1e6 * 5_590_300.0 * joule) < 1e-12);
    // No energy tabulated for C-14.
    assert_eq!(power[&id("C-14")], 0.0);
    let total = inv.total_decay_power();
    assert!(rel_err(total, power[&id("Cs-137")] + power[&id("Rn-222")]) < 1e-12);

    // Ba-137m grows in and adds its own gamma power.
    let later = inv.decay(1.0, TimeUnit::Hour).unwrap();
    assert!(later.total_decay_power() > total);
}

#[test]
fn readable_half_lives_per_nuclide() {
    let inv = Inventory::new(sample_dataset(), [("Mo-99", 1.0), ("Ru-99", 1.0)], QuantityUnit::Atoms).unwrap();
    let readable = inv.half_lives_readable();
    assert_eq!(readable[0], (id("Mo-99"), "2.7475 d".to_string()));
    assert_eq!(readable[1], (id("Ru-99"), "stable".to_string()));
}
