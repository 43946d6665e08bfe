//! 后处理模块
//!
//! 目前只有 Bloom。它在外部管线中表现为单个任务，内部是固定的模糊通道序列。
//!
//! # 示例
//!
//! ```ignore
//! setup_bloom(&mut resources, &mut pipeline, "hdr_color", 9, 1.0)?;
//! pipeline.add_task(CompositionTask::new("hdr_color", BLOOM_OUTPUT, "display"));
//! ```

pub mod bloom;

pub use bloom::{setup_bloom, BloomPhase, BloomTask, BLOOM_OUTPUT};
