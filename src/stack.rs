/// maximum nesting of subroutine calls
pub const STACK_DEPTH: usize = 16;

/// Return addresses for CALL/RET. Fixed capacity: running out is a hardware
/// limit, so push and pop hand back `None` rather than growing or wrapping.
#[derive(Debug, Default)]
pub struct CallStack {
    slots: [u16; STACK_DEPTH],
    depth: usize,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if the stack is already full
    #[must_use]
    pub fn push(&mut self, addr: u16) -> Option<()> {
        let slot = self.slots.get_mut(self.depth)?;
        *slot = addr;
        self.depth += 1;
        Some(())
    }

    /// `None` if the stack is empty
    #[must_use]
    pub fn pop(&mut self) -> Option<u16> {
        self.depth = self.depth.checked_sub(1)?;
        Some(self.slots[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}
