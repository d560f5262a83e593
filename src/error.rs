use crate::dates::DateKind;
use std::{
    error::Error,
    fmt::{Display, Formatter},
};
use strum::{EnumIter, IntoStaticStr};

/// The kinds of failures the library can report.
///
/// Every variant of [FireSmokeError] maps onto exactly one of these, they are used as the keys when
/// counting failures across a batch of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, strum::Display)]
pub enum ErrorKind {
    /// A coordinate could not be converted out of the source projection.
    Projection,
    /// A ring had too few points for the requested calculation.
    EmptyRing,
    /// A labelled date in the free text annotation was not a real calendar date.
    DateParse,
    /// A record had no usable geometry.
    MissingGeometry,
    /// Bad configuration, every record would fail the same way.
    Config,
}

/// Errors produced by this crate.
///
/// Only [FireSmokeError::Config] is ever fatal. All the others are caught at the record boundary
/// and turned into missing values on that record.
#[derive(Debug, Clone, PartialEq)]
pub enum FireSmokeError {
    Projection { x: f64, y: f64, msg: &'static str },
    EmptyRing { points: usize, required: usize },
    DateParse { kind: DateKind, text: String },
    MissingGeometry { msg: String },
    Config { msg: String },
}

impl FireSmokeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Projection { .. } => ErrorKind::Projection,
            Self::EmptyRing { .. } => ErrorKind::EmptyRing,
            Self::DateParse { .. } => ErrorKind::DateParse,
            Self::MissingGeometry { .. } => ErrorKind::MissingGeometry,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config { msg: msg.into() }
    }
}

impl Display for FireSmokeError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::Projection { x, y, msg } => write!(f, "unable to project ({}, {}): {}", x, y, msg),
            Self::EmptyRing { points, required } => write!(
                f,
                "ring has {} points, at least {} required",
                points, required
            ),
            Self::DateParse { kind, text } => write!(f, "invalid {} date: {}", kind, text),
            Self::MissingGeometry { msg } => write!(f, "no usable geometry: {}", msg),
            Self::Config { msg } => write!(f, "configuration error: {}", msg),
        }
    }
}

impl Error for FireSmokeError {}

pub type FireSmokeResult<T> = Result<T, FireSmokeError>;
