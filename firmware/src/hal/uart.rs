// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use stm32ral::usart;
use stm32ral::{read_reg, write_reg, modify_reg};

/// What a receive event turned out to be.
#[derive(Copy, Clone, Debug)]
pub enum Rx {
    Byte(u8),
    /// Framing, noise, parity or overrun error. Any received data is lost.
    Error,
    /// Spurious event with nothing to read.
    Empty,
}

/// 8N1 asynchronous serial port.
pub struct UART {
    p: usart::Instance,
}

impl UART {
    pub fn new(p: usart::Instance) -> Self {
        UART { p }
    }

    /// Enable the port at `baud` given its peripheral clock `pclk_hz`.
    pub fn setup(&self, pclk_hz: u32, baud: u32) {
        write_reg!(usart, self.p, CR1, 0);
        // 16x oversampling: BRR is just the divider in 12.4 fixed point.
        write_reg!(usart, self.p, BRR, (pclk_hz + baud / 2) / baud);
        write_reg!(usart, self.p, CR2, 0);
        write_reg!(usart, self.p, CR3, 0);
        write_reg!(usart, self.p, CR1, UE: 1, TE: 1, RE: 1);
    }

    /// Allow received data (and overruns) to raise this port's interrupt.
    pub fn listen(&self) {
        modify_reg!(usart, self.p, CR1, RXNEIE: 1);
    }

    /// Stop received data raising this port's interrupt. Data keeps arriving
    /// in the receive register.
    pub fn unlisten(&self) {
        modify_reg!(usart, self.p, CR1, RXNEIE: 0);
    }

    /// Service a receive event.
    pub fn receive(&self) -> Rx {
        let (rxne, ore, fe, ne, pe) = read_reg!(usart, self.p, SR, RXNE, ORE, FE, NE, PE);
        if ore | fe | ne | pe != 0 {
            // The SR read above followed by a DR read clears the error flags.
            let _ = read_reg!(usart, self.p, DR);
            Rx::Error
        } else if rxne != 0 {
            Rx::Byte(read_reg!(usart, self.p, DR) as u8)
        } else {
            Rx::Empty
        }
    }

    /// Drop any received data or pending error and leave the receiver enabled.
    pub fn flush_rx(&self) {
        let _ = read_reg!(usart, self.p, SR);
        let _ = read_reg!(usart, self.p, DR);
        modify_reg!(usart, self.p, CR1, RE: 1);
    }

    /// Block until the transmit register is free, then load `byte`.
    pub fn write(&self, byte: u8) {
        while read_reg!(usart, self.p, SR, TXE == 0) {}
        write_reg!(usart, self.p, DR, byte as u32);
    }
}
