//! # Resources
//! The pin map of the device. Peripherals are grouped per task here and handed out in
//! `main` with `split_resources!`.
use assign_resources::assign_resources;
use embassy_rp::i2c::InterruptHandler as I2cInterruptHandler;
use embassy_rp::peripherals::{I2C0, I2C1, PIO0};
use embassy_rp::pio::InterruptHandler;
use embassy_rp::{bind_interrupts, peripherals};

assign_resources! {
    buttons: ButtonResources {
        up: PIN_20,
        down: PIN_21,
        select: PIN_22,
        cancel: PIN_26,
    },
    wifi: WifiResources {
        pwr_pin: PIN_23,
        cs_pin: PIN_25,
        pio_sm: PIO0,
        dio_pin: PIN_24,
        clk_pin: PIN_29,
        dma_ch: DMA_CH0,
    },
    rtc: RtcResources {
        rtc_inst: RTC,
    },
    display: DisplayResources {
        scl: PIN_13,
        sda: PIN_12,
        i2c0: I2C0,
    },
    sensor: SensorResources {
        scl: PIN_15,
        sda: PIN_14,
        i2c1: I2C1,
    },
    alerts: AlertResources {
        led: PIN_16,
        buzzer: PIN_17,
    },
}

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    I2C1_IRQ => I2cInterruptHandler<I2C1>;
});
