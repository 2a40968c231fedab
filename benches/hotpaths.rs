// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Benchmarks the two hot paths every co-location run spends most of its
//! time in: bounding-box reduction over a realistically sized model grid,
//! and spatial interpolation onto a trajectory's worth of destinations.

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array1, ArrayD, IxDyn};

use vision_colocate::bbox::{self, ObsBounds};
use vision_colocate::field::coordinate::{Calendar, DimensionCoordinate, Units};
use vision_colocate::field::Field;
use vision_colocate::spatial::regridder::{DefaultRegridder, InterpolationMethod, LocstreamRegridder};
use vision_colocate::spatial::{colocate_spatial, SampleLocation};

fn big_model() -> Field {
    let n_time = 24;
    let n_lat = 180;
    let n_lon = 360;
    let data = ArrayD::zeros(IxDyn(&[n_time, n_lat, n_lon]));

    let time = DimensionCoordinate {
        standard_name: "time".into(),
        units: Units::new("hours since 2000-01-01 00:00:00"),
        calendar: Some(Calendar::Standard),
        axis: 0,
        data: Array1::linspace(0.0, (n_time - 1) as f64, n_time).into_dyn(),
        bounds: None,
    };
    let lat = DimensionCoordinate {
        standard_name: "latitude".into(),
        units: Units::new("degrees_north"),
        calendar: None,
        axis: 1,
        data: Array1::linspace(-90.0, 90.0, n_lat).into_dyn(),
        bounds: None,
    };
    let lon = DimensionCoordinate {
        standard_name: "longitude".into(),
        units: Units::new("degrees_east"),
        calendar: None,
        axis: 2,
        data: Array1::linspace(0.0, 359.0, n_lon).into_dyn(),
        bounds: None,
    };
    Field::new("air_temperature", "K", data)
        .with_dimension_coordinate(time)
        .with_dimension_coordinate(lat)
        .with_dimension_coordinate(lon)
}

fn trajectory_destinations(n: usize) -> Vec<SampleLocation> {
    (0..n)
        .map(|i| SampleLocation {
            latitude: -60.0 + (i as f64 * 0.01),
            longitude: (i as f64 * 0.02) % 360.0,
            vertical: None,
        })
        .collect()
}

fn bench_bbox_reduce(c: &mut Criterion) {
    let model = big_model();
    let obs = ObsBounds {
        time: (2.0, 10.0),
        latitude: (-61.0, -55.0),
        longitude: (0.0, 20.0),
        vertical: None,
    };
    c.bench_function("bbox_reduce", |b| {
        b.iter(|| bbox::reduce(&model, &obs, 1).unwrap())
    });
}

fn bench_spatial_colocate(c: &mut Criterion) {
    let model = big_model();
    let obs = ObsBounds {
        time: (0.0, 23.0),
        latitude: (-61.0, -55.0),
        longitude: (0.0, 20.0),
        vertical: None,
    };
    let reduced = bbox::reduce(&model, &obs, 1).unwrap();
    let destinations = trajectory_destinations(2000);
    let regridder = DefaultRegridder {
        method: InterpolationMethod::Linear,
    };

    c.bench_function("spatial_colocate_trajectory", |b| {
        b.iter(|| {
            colocate_spatial(&reduced, &destinations, "air_pressure", false, &regridder).unwrap()
        })
    });
}

criterion_group!(benches, bench_bbox_reduce, bench_spatial_colocate);
criterion_main!(benches);
