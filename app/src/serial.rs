/// An IRQ driven, transmit only serial port carrying the note event stream
///
pub mod uart1 {
    use crate::interrupt;
    use crate::hal::{
        pac,
        prelude::*,
        serial::{
            Event,
            Serial,
        }
    };
    use heapless::spsc::{Consumer, Producer, Queue};
    use stm32f0xx_hal::gpio::{
        gpiob,
        Alternate,
        AF0,
    };

    const TX_Q_SIZE: usize = 128;

    static mut TX_Q_CONSUMER: Option<Consumer<u8, TX_Q_SIZE>> = None;
    static mut TX_Q_PRODUCER: Option<Producer<u8, TX_Q_SIZE>> = None;

    pub type TxPinType = gpiob::PB6<Alternate<AF0>>;
    pub type RxPinType = gpiob::PB7<Alternate<AF0>>;
    static mut SERIAL: Option<Serial<pac::USART1, TxPinType, RxPinType>> = None;

    /// Must be called once during application initialization, before any write
    pub fn init(serial: Serial<pac::USART1, TxPinType, RxPinType>, irq_prio: u8) {
        let core = unsafe { pac::CorePeripherals::steal() };
        let mut nvic = core.NVIC;

        static mut TX_Q: Queue<u8, TX_Q_SIZE> = Queue::new();

        let (tx_q_producer, tx_q_consumer) = unsafe { TX_Q.split() };

        unsafe {
            TX_Q_PRODUCER = Some(tx_q_producer);
            TX_Q_CONSUMER = Some(tx_q_consumer);
            SERIAL = Some(serial);

            nvic.set_priority(pac::Interrupt::USART1, irq_prio);
            pac::NVIC::unmask(pac::Interrupt::USART1);
        }
    }

    /// Number of bytes that can be queued without dropping any
    pub fn free() -> usize {
        let tx_q_producer = unsafe { TX_Q_PRODUCER.as_ref().unwrap_unchecked() };
        tx_q_producer.capacity() - tx_q_producer.len()
    }

    /// Queue bytes for transmission, dropping any that don't fit
    pub fn write(bytes: &[u8]) {
        let tx_q_producer = unsafe { TX_Q_PRODUCER.as_mut().unwrap_unchecked() };
        for b in bytes {
            if tx_q_producer.enqueue(*b).is_err() {
                break;
            }
        }
        let serial = unsafe { SERIAL.as_mut().unwrap_unchecked() };
        serial.listen(Event::Txe);
    }

    #[interrupt]
    fn USART1() {
        let serial = unsafe { SERIAL.as_mut().unwrap_unchecked() };
        let tx_q_consumer = unsafe { TX_Q_CONSUMER.as_mut().unwrap_unchecked() };
        let usart1 = unsafe { crate::hal::pac::Peripherals::steal().USART1 };

        // Check if there is room to transmit a byte
        let isr = (*usart1).isr.read();
        if isr.txe().bit_is_set() {
            match tx_q_consumer.dequeue() {
                Some(b) => {
                    serial.write(b).ok();
                },
                None => {
                    // If the Q is empty, mask the TXE interrupt. It is re-enabled by the next write.
                    serial.unlisten(Event::Txe);
                }
            }
        }
    }
}

/// Event sink writing one label per line to USART1. A host side bridge relays the lines to
/// listening clients.
pub struct SerialSink {
    dropped: u32,
}

impl SerialSink {
    /// uart1::init must have been called first
    pub fn new() -> Self {
        Self { dropped: 0 }
    }

    /// Number of labels that did not fit in the transmit queue
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl touch::EventSink for SerialSink {
    fn broadcast(&mut self, label: &str) {
        // Only whole lines are queued so a full queue never emits a truncated label
        if uart1::free() < label.len() + 2 {
            self.dropped += 1;
            return;
        }
        uart1::write(label.as_bytes());
        uart1::write(b"\r\n");
    }
}
