//! Message-branch gating

use lpr_fusion_common::{Batch, Frame};
use tracing::trace;

/// Whether a batch continues toward the message transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Forward,
    Drop,
}

/// A frame continues only if composition attached at least one record
#[must_use]
pub fn should_continue(frame: &Frame) -> bool {
    !frame.side_data.is_empty()
}

/// Gate a whole batch. The first frame without side-data drops the batch;
/// frames are never dropped individually.
#[must_use]
pub fn gate_batch(batch: &Batch) -> GateDecision {
    match batch.frames.iter().position(|f| !should_continue(f)) {
        Some(idx) => {
            trace!("Frame {} carries no side-data, dropping batch", idx);
            GateDecision::Drop
        }
        None => GateDecision::Forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpr_fusion_common::SideDataRecord;

    fn frame_with_records(n: usize) -> Frame {
        let mut frame = Frame::default();
        for i in 0..n {
            frame
                .side_data
                .push(SideDataRecord::new(i as u64, format!("Vehicle ID: {i}")));
        }
        frame
    }

    #[test]
    fn test_frame_without_records_stops() {
        assert!(!should_continue(&frame_with_records(0)));
        assert!(should_continue(&frame_with_records(2)));
    }

    #[test]
    fn test_all_empty_batch_is_dropped() {
        let batch = Batch::new(vec![frame_with_records(0), frame_with_records(0)]);
        assert_eq!(gate_batch(&batch), GateDecision::Drop);
    }

    #[test]
    fn test_one_empty_frame_drops_whole_batch() {
        let batch = Batch::new(vec![frame_with_records(1), frame_with_records(0)]);
        assert_eq!(gate_batch(&batch), GateDecision::Drop);
    }

    #[test]
    fn test_every_frame_with_records_forwards() {
        let batch = Batch::new(vec![frame_with_records(1), frame_with_records(3)]);
        assert_eq!(gate_batch(&batch), GateDecision::Forward);
    }

    #[test]
    fn test_empty_batch_forwards() {
        assert_eq!(gate_batch(&Batch::default()), GateDecision::Forward);
    }
}
