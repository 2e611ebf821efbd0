#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRequestFlags(u32);

impl LineRequestFlags {
    pub const OUTPUT: LineRequestFlags = LineRequestFlags(1 << 1);

    pub fn contains(self, other: LineRequestFlags) -> bool {
        self.0 & other.0 == other.0
    }
}
