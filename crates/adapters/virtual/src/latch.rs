//! Output latch of a single expander board.

use khrushchevka_domain::light::Pin;

/// The 16 output bits of one board: port `A` in the low byte, port `B` in
/// the high byte, one bit per [`Pin`] in declaration order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OutputLatch(u16);

impl OutputLatch {
    fn mask(pin: Pin) -> u16 {
        1 << (pin as u16)
    }

    pub(crate) fn write(&mut self, pin: Pin, is_on: bool) {
        if is_on {
            self.0 |= Self::mask(pin);
        } else {
            self.0 &= !Self::mask(pin);
        }
    }

    pub(crate) fn read(self, pin: Pin) -> bool {
        self.0 & Self::mask(pin) != 0
    }

    /// Switch every line off and return the lines that were lit.
    pub(crate) fn clear(&mut self) -> Vec<Pin> {
        let lit = Pin::ALL.into_iter().filter(|pin| self.read(*pin)).collect();
        self.0 = 0;
        lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_ports_apart() {
        let mut latch = OutputLatch::default();
        latch.write(Pin::A3, true);
        assert!(latch.read(Pin::A3));
        assert!(!latch.read(Pin::B3));
        assert_eq!(latch.0, 0b0000_0000_0000_1000);

        latch.write(Pin::B7, true);
        assert_eq!(latch.0, 0b1000_0000_0000_1000);
    }

    #[test]
    fn should_switch_line_off() {
        let mut latch = OutputLatch::default();
        latch.write(Pin::B0, true);
        latch.write(Pin::B0, false);
        assert!(!latch.read(Pin::B0));
    }

    #[test]
    fn should_report_lit_lines_on_clear() {
        let mut latch = OutputLatch::default();
        latch.write(Pin::A0, true);
        latch.write(Pin::B5, true);

        assert_eq!(latch.clear(), vec![Pin::A0, Pin::B5]);
        assert_eq!(latch, OutputLatch::default());
    }
}
