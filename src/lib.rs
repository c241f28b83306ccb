//! strata: a growable contiguous array, a doubly linked list and a unique owning pointer,
//! all built on a small raw allocation layer, plus the logger they report through.

pub use strata_common as common;
pub use strata_logging as logging;

pub mod prelude {
    pub use strata_common::prelude::*;
    pub use strata_logging::{
        get_logger, LogCategory, LogLevel, Logger,
        log, log_severe, log_error, log_warning, log_info, log_verbose, log_debug,
    };
}
