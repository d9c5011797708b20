//! Integration test: observations through the whole binning pipeline.
//!
//! Builds contexts from YAML configs, feeds synthetic passes through
//! `Binner::run` and checks the output bins against what the aggregators
//! must produce.

use binning::{
    BinOutput, BinSink, Binner, BinningConfig, BinningContext, CollectingSink, JsonLinesSink,
    Observation, PlanetaryGrid, VecObservationSource,
};
use test_utils::{
    assert_approx_eq, assert_features_approx_eq, bbox, configs, create_chlorophyll_pass,
    create_ndvi_pass, time, with_nan_values, SyntheticObservation,
};

fn to_observations(samples: Vec<SyntheticObservation>) -> Vec<Observation> {
    samples
        .into_iter()
        .map(|s| Observation::new(s.lat, s.lon, s.mjd, s.values))
        .collect()
}

fn context(yaml: &str) -> BinningContext {
    BinningConfig::from_yaml_str(yaml)
        .unwrap()
        .create_binning_context()
        .unwrap()
}

fn run(context: &BinningContext, source: &VecObservationSource) -> CollectingSink {
    let mut sink = CollectingSink::new();
    Binner::new(context).run(source, &mut sink).unwrap();
    sink
}

fn column(sink: &CollectingSink, name: &str) -> usize {
    sink.feature_names
        .iter()
        .position(|n| n == name)
        .unwrap_or_else(|| panic!("no feature {name} in {:?}", sink.feature_names))
}

fn bin_at<'a>(sink: &'a CollectingSink, grid: &dyn PlanetaryGrid, lat: f64, lon: f64) -> &'a BinOutput {
    let index = grid.bin_index(lat, lon);
    sink.bins
        .iter()
        .find(|b| b.index == index)
        .unwrap_or_else(|| panic!("no output bin {index}"))
}

const MAX_WITH_MASK_YAML: &str = r#"
planetary_grid: sea
num_rows: 180
variables: [value, mask, passthrough]
aggregators:
  - type: ON_MAX_SET_WITH_MASK
    on_max_var_name: value
    mask_var_name: mask
    target_name: value
    set_var_names: [passthrough]
"#;

#[test]
fn test_max_with_mask_spatial_example() {
    let ctx = context(MAX_WITH_MASK_YAML);
    let source = VecObservationSource::new(vec![vec![
        Observation::new(45.2, 7.2, 4.0, vec![0.5, 1.0, 1.0]),
        Observation::new(45.3, 7.3, 5.0, vec![0.8, 0.0, 2.0]),
    ]]);
    let sink = run(&ctx, &source);

    assert_eq!(
        sink.feature_names,
        vec!["value_max", "value_mjd", "value_count", "passthrough"]
    );
    assert_eq!(sink.bins.len(), 1);
    let bin = &sink.bins[0];
    assert_eq!(bin.num_obs, 2);
    assert_eq!(bin.num_passes, 1);
    assert_eq!(bin.features, vec![0.5, 4.0, 1.0, 1.0]);
}

#[test]
fn test_max_with_mask_temporal_example() {
    let ctx = context(MAX_WITH_MASK_YAML);
    // Pass 1 completes to (0.6, 4, 3, 9.7), pass 2 to (0.3, 5, 2, 9.8).
    let source = VecObservationSource::new(vec![
        vec![
            Observation::new(45.2, 7.2, 4.0, vec![0.6, 1.0, 9.7]),
            Observation::new(45.3, 7.3, 4.2, vec![0.2, 1.0, 9.6]),
            Observation::new(45.4, 7.4, 4.4, vec![0.6, 1.0, 9.5]),
        ],
        vec![
            Observation::new(45.2, 7.2, 5.0, vec![0.3, 1.0, 9.8]),
            Observation::new(45.3, 7.3, 5.1, vec![f32::NAN, 1.0, 9.9]),
        ],
    ]);
    let sink = run(&ctx, &source);

    assert_eq!(sink.bins.len(), 1);
    let bin = &sink.bins[0];
    assert_eq!(bin.num_obs, 5);
    assert_eq!(bin.num_passes, 2);
    assert_eq!(bin.features, vec![0.6, 4.0, 5.0, 9.7]);
}

#[test]
fn test_max_with_mask_nothing_valid() {
    let ctx = context(MAX_WITH_MASK_YAML);
    let source = VecObservationSource::new(vec![vec![
        Observation::new(-10.5, 100.5, 4.0, vec![f32::NAN, 1.0, 1.0]),
        Observation::new(-10.5, 100.5, 4.0, vec![f32::NAN, 1.0, 2.0]),
    ]]);
    let sink = run(&ctx, &source);

    let bin = &sink.bins[0];
    assert!(bin.features[0].is_nan());
    assert!(bin.features[1].is_nan());
    assert_eq!(bin.features[2], 2.0);
    assert!(bin.features[3].is_nan());
}

#[test]
fn test_mean_over_passes() {
    let ctx = context(configs::MINIMAL_YAML);
    let grid = ctx.planetary_grid();
    let pass1 = to_observations(create_chlorophyll_pass(bbox::SMALL, 0.1, time::REFERENCE_MJD));
    let pass2 = to_observations(with_nan_values(
        &create_chlorophyll_pass(bbox::SMALL, 0.1, time::REFERENCE_MJD + 1.0),
        0,
        &[0, 1, 2],
    ));
    let source = VecObservationSource::new(vec![pass1.clone(), pass2]);
    let sink = run(&ctx, &source);

    assert_eq!(sink.feature_names, vec!["chl_mean", "chl_sigma"]);
    assert!(!sink.bins.is_empty());

    // Reference: per bin, mean of the per-pass means of the valid values.
    for bin in &sink.bins {
        assert_eq!(bin.num_passes, 2);
        let values: Vec<f64> = pass1
            .iter()
            .filter(|o| grid.bin_index(o.lat(), o.lon()) == bin.index)
            .map(|o| o.get(0) as f64)
            .collect();
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        assert_approx_eq!(bin.features[0], expected, 1e-4);
        assert!(bin.features[1] >= 0.0);
    }

    // The chlorophyll gradient only varies with latitude.
    let north = bin_at(&sink, grid, 40.95, 10.5);
    let south = bin_at(&sink, grid, 40.05, 10.5);
    assert!(north.features[0] >= south.features[0]);
}

#[test]
fn test_all_aggregators_consistent() {
    let ctx = context(configs::FULL_YAML);
    let passes = (0..4)
        .map(|pass| {
            to_observations(create_ndvi_pass(
                (-30.0, 0.0, 30.0, 50.0),
                0.5,
                time::REFERENCE_MJD + pass as f64,
                pass,
                42,
            ))
        })
        .collect();
    let source = VecObservationSource::new(passes);
    let sink = run(&ctx, &source);

    assert_eq!(
        sink.feature_names,
        vec![
            "ndvi_mean",
            "ndvi_sigma",
            "ndvi_counts",
            "ndvi_range_min",
            "ndvi_range_max",
            "ndvi_peak_max",
            "ndvi_peak_mjd",
            "pass",
            "ndvi_clear_max",
            "ndvi_clear_mjd",
            "ndvi_clear_count",
            "ndvi_p50",
        ]
    );
    assert!(!sink.bins.is_empty());

    let (mean, counts) = (column(&sink, "ndvi_mean"), column(&sink, "ndvi_counts"));
    let (min, max) = (column(&sink, "ndvi_range_min"), column(&sink, "ndvi_range_max"));
    let (peak, peak_mjd, pass) = (
        column(&sink, "ndvi_peak_max"),
        column(&sink, "ndvi_peak_mjd"),
        column(&sink, "pass"),
    );
    let (clear, clear_count) = (
        column(&sink, "ndvi_clear_max"),
        column(&sink, "ndvi_clear_count"),
    );
    let p50 = column(&sink, "ndvi_p50");

    for bin in &sink.bins {
        let f = &bin.features;
        assert_eq!(f[counts] as u32, bin.num_obs);
        assert!(f[min] <= f[mean] + 1e-6 && f[mean] <= f[max] + 1e-6);
        assert!(f[min] <= f[p50] + 1e-6 && f[p50] <= f[max] + 1e-6);
        assert_eq!(f[peak], f[max]);
        // The maximum was found in the pass recorded with it.
        assert_eq!(f[peak_mjd].floor(), (time::REFERENCE_MJD as f32 + f[pass]).floor());
        assert!(f[clear_count] <= bin.num_obs as f32);
        if f[clear_count] > 0.0 {
            assert!(f[clear] <= f[peak]);
        } else {
            assert!(f[clear].is_nan());
        }
    }
}

#[test]
fn test_region_and_period_filters() {
    let ctx = context(configs::FULL_YAML);
    let in_period = to_observations(create_ndvi_pass(
        (-30.0, 0.0, 30.0, 50.0),
        1.0,
        time::REFERENCE_MJD,
        0,
        1,
    ));
    let after_period = to_observations(create_ndvi_pass(
        (-30.0, 0.0, 30.0, 50.0),
        1.0,
        time::REFERENCE_MJD + 8.5,
        1,
        1,
    ));
    let source = VecObservationSource::new(vec![in_period.clone(), after_period]);
    let mut sink = CollectingSink::new();
    let summary = Binner::new(&ctx).run(&source, &mut sink).unwrap();

    let region = ctx.region().unwrap();
    let inside = in_period
        .iter()
        .filter(|o| region.contains(o.lat(), o.lon()))
        .count() as u64;
    assert_eq!(summary.num_observations, 2 * in_period.len() as u64);
    assert_eq!(summary.num_binned, inside);
    assert!(sink.bins.iter().all(|b| b.num_passes == 1));

    let bounds = region.bounds();
    for bin in &sink.bins {
        // A bin is at most about 1.3 degrees wide at these latitudes.
        assert!(bin.center_lon >= bounds.min_lon - 2.0 && bin.center_lon <= bounds.max_lon + 2.0);
        assert!(bin.center_lat >= bounds.min_lat - 2.0 && bin.center_lat <= bounds.max_lat + 2.0);
    }
}

#[test]
fn test_mosaicking_keeps_first_observation_per_pass() {
    let yaml = format!("{}compositing_type: mosaicking\n", configs::MINIMAL_YAML);
    let ctx = context(&yaml);
    let grid = ctx.planetary_grid();
    let first = Observation::new(40.5, 10.5, time::REFERENCE_MJD, vec![1.0]);
    let second = Observation::new(40.49, 10.49, time::REFERENCE_MJD, vec![5.0]);
    let later = Observation::new(40.5, 10.5, time::REFERENCE_MJD + 1.0, vec![3.0]);
    let source = VecObservationSource::new(vec![vec![first, second], vec![later]]);
    let sink = run(&ctx, &source);

    let bin = bin_at(&sink, grid, 40.5, 10.5);
    assert_eq!(bin.num_obs, 2);
    assert_eq!(bin.num_passes, 2);
    assert_features_approx_eq!(&bin.features, &[2.0_f32, 1.0], 1e-6);
}

#[test]
fn test_output_is_deterministic() {
    let ctx = context(configs::NDVI_MAX_YAML);
    let passes: Vec<_> = (0..6)
        .map(|pass| {
            to_observations(create_ndvi_pass(
                bbox::EUROPE,
                0.25,
                time::REFERENCE_MJD + pass as f64 * 0.5,
                pass,
                9,
            ))
        })
        .collect();
    let source = VecObservationSource::new(passes);

    let render = || {
        let mut sink = JsonLinesSink::new(Vec::new());
        Binner::new(&ctx).run(&source, &mut sink).unwrap();
        let written = sink.bins_written();
        (String::from_utf8(sink.into_inner()).unwrap(), written)
    };
    let (first, written) = render();
    let (second, _) = render();
    assert_eq!(first, second);
    assert_eq!(first.lines().count(), written + 1);
    assert!(first.starts_with(r#"{"features":["ndvi_max","ndvi_mjd","ndvi_count","pass"]}"#));
}

#[test]
fn test_empty_source_still_announces_features() {
    let ctx = context(configs::NDVI_MAX_YAML);
    let mut sink = JsonLinesSink::new(Vec::new());
    let summary = Binner::new(&ctx)
        .run(&VecObservationSource::default(), &mut sink)
        .unwrap();
    assert_eq!(summary.num_output_bins, 0);
    sink.finish().unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(text.lines().count(), 1);
}
