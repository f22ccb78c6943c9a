pub(crate) mod bytecode;
pub(crate) mod interpreter;
pub(crate) mod player;
