// Pipeline processing: transformation, validation, normalization and compression

pub mod compress;
pub mod normalize;
pub mod transform;
pub mod validate;
