//! Measurement projection
//!
//! A static, ordered table of [`MeasurementDescriptor`]s turns the latest
//! snapshot into named scalar readings with attributes. Every descriptor goes
//! through the same pure [`project`] function.

pub mod descriptors;
pub mod projection;

pub use descriptors::{
    DESCRIPTORS, DeviceClass, MeasurementDescriptor, StateClass, UNIT_EURO_PER_KWH, descriptor,
};
pub use projection::{Measurement, MeasurementValue, Projection, project, render_all};
