//! Integration tests for cross-stage association

use lpr_fusion_association::{associate_batch, associate_frame};
use lpr_fusion_common::{Batch, DetectedObject, Frame, Region};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn street_frame() -> Frame {
    Frame::with_objects(vec![
        DetectedObject::vehicle(10, Region::new(100.0, 400.0, 300.0, 200.0)),
        DetectedObject::vehicle(11, Region::new(900.0, 420.0, 280.0, 190.0)),
        DetectedObject::plate(1, Region::new(220.0, 540.0, 70.0, 22.0)),
        DetectedObject::plate(2, Region::new(1010.0, 560.0, 68.0, 21.0)),
        DetectedObject::plate(3, Region::new(1700.0, 900.0, 60.0, 20.0)),
    ])
}

#[test]
fn test_each_plate_takes_its_vehicle_identity() {
    init_tracing();
    let mut frame = street_frame();

    assert_eq!(associate_frame(&mut frame), 2);

    let plate_ids: Vec<u64> = frame.plates().map(|p| p.identity).collect();
    assert_eq!(plate_ids, vec![10, 11, 3]);
}

#[test]
fn test_batch_association_is_per_frame() {
    init_tracing();
    // The vehicle lives in frame 0 only; the plate in frame 1 must not see it.
    let mut batch = Batch::new(vec![
        Frame::with_objects(vec![DetectedObject::vehicle(
            10,
            Region::new(0.0, 0.0, 100.0, 100.0),
        )]),
        Frame::with_objects(vec![DetectedObject::plate(
            4,
            Region::new(10.0, 10.0, 20.0, 10.0),
        )]),
    ]);

    assert_eq!(associate_batch(&mut batch), 0);
    assert_eq!(batch.frames[1].objects[0].identity, 4);
}

#[test]
fn test_association_is_idempotent() {
    init_tracing();
    let mut frame = street_frame();
    associate_frame(&mut frame);
    let once = frame.clone();
    associate_frame(&mut frame);
    assert_eq!(frame, once);
}
