//! Module and option selection.
//!
//! Both indices start unset. An unset module means "select the first module
//! on the next iteration"; an unset option means no option is chosen.
//! Changing module always clears the option.

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct NavigationState {
    selected_module: Option<usize>,
    selected_option: Option<usize>,
}

impl NavigationState {
    pub const fn new() -> Self {
        Self {
            selected_module: None,
            selected_option: None,
        }
    }

    #[inline]
    pub const fn selected_module(&self) -> Option<usize> {
        self.selected_module
    }

    #[inline]
    pub const fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    /// True until the first module has been selected.
    #[inline]
    pub const fn is_uninitialized(&self) -> bool {
        self.selected_module.is_none()
    }

    /// Advance to the next module, wrapping after the last, and clear the
    /// option. Returns the new module index.
    ///
    /// `module_count` must be non-zero; configuration validation rejects an
    /// empty module list.
    pub fn next_module(&mut self, module_count: usize) -> usize {
        let next = match self.selected_module {
            Some(current) => (current + 1) % module_count.max(1),
            None => 0,
        };
        self.selected_module = Some(next);
        self.selected_option = None;
        next
    }

    /// Advance to the next option of the current module, wrapping after the
    /// last. A module without options leaves the state untouched and returns
    /// `false`.
    pub fn next_option(&mut self, option_count: usize) -> bool {
        if option_count == 0 {
            return false;
        }
        self.selected_option = Some(match self.selected_option {
            Some(current) => (current + 1) % option_count,
            None => 0,
        });
        true
    }
}
