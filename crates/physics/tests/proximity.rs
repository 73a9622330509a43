use physics::{Band, ProximityBands, Vec2};

#[test]
fn closer_never_means_lower_priority() {
    for bands in [
        ProximityBands::default(),
        ProximityBands { contact_radius: 2.0, ..Default::default() },
        ProximityBands { contact_radius: 0.0, very_near: 1.0, near: 40.0, far: 90.0 },
    ] {
        assert!(bands.is_ordered());
        let mut previous = Band::OutOfRange;
        // Sweep from far away towards the reference point.
        let mut distance = 120.0;
        while distance >= 0.0 {
            let band = bands.classify_distance(distance);
            assert!(
                band.priority() >= previous.priority(),
                "band dropped from {previous:?} to {band:?} at distance {distance}"
            );
            previous = band;
            distance -= 0.25;
        }
        assert!(bands.classify_distance(0.0) >= Band::VeryNear);
    }
}

#[test]
fn classify_reports_euclidean_distance() {
    let bands = ProximityBands::default();
    let p = bands.classify(Vec2::new(0.0, 0.0), Vec2::new(30.0, 40.0));
    assert!((p.distance - 50.0).abs() < 1e-12);
    assert_eq!(p.band, Band::OutOfRange);

    let p = bands.classify(Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0));
    assert_eq!(p.band, Band::Contact);
}

#[test]
fn unordered_thresholds_are_detected() {
    let bands = ProximityBands { contact_radius: 2.0, very_near: 12.0, near: 10.0, far: 15.0 };
    assert!(!bands.is_ordered());
}
