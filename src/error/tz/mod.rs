pub(crate) mod ambiguous;
pub(crate) mod db;
pub(crate) mod offset;
