pub(crate) mod bezier;
pub(crate) mod segments;
pub(crate) mod trajectory;
pub(crate) mod window;
pub(crate) mod yaw;
