//! Re-entrancy flag

use crate::error::{Result, TokenError};

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: bool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn enter(&mut self) -> Result<()> {
        if self.entered {
            return Err(TokenError::Reentrancy);
        }
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_enter_rejected() {
        let mut guard = ReentrancyGuard::new();
        guard.enter().unwrap();
        assert!(matches!(guard.enter(), Err(TokenError::Reentrancy)));

        guard.exit();
        assert!(!guard.is_entered());
        assert!(guard.enter().is_ok());
    }
}
