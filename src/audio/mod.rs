pub mod decode;
pub mod reduce;
