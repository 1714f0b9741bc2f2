pub(crate) mod layout;
pub(crate) mod manifest;
pub(crate) mod pack;
