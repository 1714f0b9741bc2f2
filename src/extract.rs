pub(crate) mod ffmpeg;
pub(crate) mod probe;
pub(crate) mod source;
