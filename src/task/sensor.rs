//! # Sensor task
//! Samples the SHT4x climate sensor on I2C1 and hands the readings to the control loop.
use crate::task::resources::{Irqs, SensorResources};
use defmt::{Debug2Format, debug, info, warn};
use embassy_rp::i2c::{Config, I2c};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Delay, Ticker};
use medibox_core::config::Settings;
use medibox_core::environment::Sample;
use sht4x::{Precision, Sht4xAsync};

/// Latest sample not yet picked up by the control loop
static SENSOR_SIGNAL: Signal<CriticalSectionRawMutex, Sample> = Signal::new();

/// Publish a sample. An older one not yet taken is replaced.
pub fn signal_sample(sample: Sample) {
    SENSOR_SIGNAL.signal(sample);
}

/// Take the latest sample without waiting
pub fn take_sample() -> Option<Sample> {
    SENSOR_SIGNAL.try_take()
}

#[embassy_executor::task]
pub async fn sensor(r: SensorResources) {
    info!("Sensor task started");

    let i2c = I2c::new_async(r.i2c1, r.scl, r.sda, Irqs, Config::default());
    let mut sht = Sht4xAsync::<_, Delay>::new(i2c);
    let mut delay = Delay;

    let mut ticker = Ticker::every(Settings::DEFAULT.sample_interval);
    loop {
        let sample = match sht.measure(Precision::High, &mut delay).await {
            Ok(m) => Sample {
                temperature: m.temperature_celsius().to_num::<f32>(),
                humidity: m.humidity_percent().to_num::<f32>(),
            },
            Err(e) => {
                warn!("SHT4x read failed: {}", Debug2Format(&e));
                Sample::FAILED
            }
        };
        debug!("sample: {}", sample);
        signal_sample(sample);
        ticker.next().await;
    }
}
