#![doc = include_str!("../README.md")]

pub mod anomaly;
pub mod config;
pub mod error;
pub mod offset;
pub mod pattern;
pub mod reader;
pub mod scanner;

// --- 주요 타입 re-export ---

// 스캐너
pub use scanner::{ScanBatch, ScanCoordinator, expand_globs};

// 설정
pub use config::{ScannerConfig, ScannerConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 구성 요소
pub use anomaly::AnomalyDetector;
pub use offset::{OffsetMap, OffsetStore};
pub use pattern::{CompiledRule, PatternGroup, PatternSet};
pub use reader::{FileReader, ReadOutcome};
