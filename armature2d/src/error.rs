use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("duplicate animation: {name}")]
    DuplicateAnimation { name: String },

    #[error("duplicate bone: {name}")]
    DuplicateBone { name: String },

    #[error("unknown parent bone '{parent}' for bone '{bone}'")]
    UnknownBoneParent { bone: String, parent: String },

    #[error("unknown bone '{bone}' referenced by slot '{slot}'")]
    UnknownSlotBone { slot: String, bone: String },

    #[error("unknown slot: {name}")]
    UnknownSlot { name: String },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },
}
