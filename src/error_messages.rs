use panicmsg::PanicMsg;

pub(crate) const OUT_OF_BOUNDS: PanicMsg = PanicMsg::new("Out of bounds");
pub(crate) const VOLUME_IS_ZERO: PanicMsg = PanicMsg::new("Width/Height/Depth cannot be 0");
pub(crate) const SIZE_TOO_LARGE: PanicMsg = PanicMsg::new("Size is too large");
pub(crate) const CELL_ID_OUT_OF_RANGE: PanicMsg = PanicMsg::new("Cell id is out of range");
