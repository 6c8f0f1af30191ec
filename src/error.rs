#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("transaction decode error: {reason}")]
    Decode { reason: String },

    #[error("instruction layout error: {reason}")]
    InstructionLayout { reason: String },
}
