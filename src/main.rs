//! Pico W firmware: keeps Wi-Fi up and reports button gestures.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::{info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_net::{Config, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level as PinLevel, Output, Pull};
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use panic_probe as _;
use static_cell::StaticCell;

use picolink::net::Cyw43Radio;
use picolink::time::EmbassyClock;
use picolink::{
    Button, ButtonConfig, ButtonEvent, ConnectivityManager, EdgeInput, Level, LinkEvent,
    ManagerConfig, NetworkConfig, Sink,
};

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// Gestures forwarded from the button task to its consumer.
static BUTTON_EVENTS: Channel<CriticalSectionRawMutex, ButtonEvent, 4> = Channel::new();

#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn button_task(mut button: Button<'static, PinEdge, EmbassyClock>) -> ! {
    button.run().await
}

#[embassy_executor::task]
async fn gesture_task() -> ! {
    loop {
        match BUTTON_EVENTS.receive().await {
            ButtonEvent::Clicked { count } => info!("clicked {} times", count),
            ButtonEvent::Holding => info!("button held"),
            _ => {}
        }
    }
}

/// [`EdgeInput`] over an RP2040 GPIO.
struct PinEdge(Input<'static>);

impl EdgeInput for PinEdge {
    async fn wait_for_edge(&mut self) {
        self.0.wait_for_any_edge().await
    }

    fn level(&self) -> Level {
        if self.0.is_high() {
            Level::High
        } else {
            Level::Low
        }
    }
}

fn log_link_event(event: &LinkEvent) {
    match event {
        LinkEvent::AttemptStarted { config_index } => {
            info!("trying network {}", config_index)
        }
        LinkEvent::AttemptFailed { config_index, .. } => {
            warn!("network {} failed", config_index)
        }
        LinkEvent::Connected { address, .. } => {
            let octets = address.octets();
            info!(
                "link up at {}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            )
        }
        LinkEvent::BackingOff { pass, delay_ms } => {
            info!("pass {} failed, backing off {} ms", pass, delay_ms)
        }
        LinkEvent::LinkLost => warn!("link lost, reconnecting"),
        LinkEvent::CampaignFailed => warn!("all networks failed"),
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Firmware blobs for the CYW43439, see README for where to get them.
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, PinLevel::Low);
    let cs = Output::new(p.PIN_25, PinLevel::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    unwrap!(spawner.spawn(cyw43_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    // TODO: seed from the ROSC random bits instead of a constant.
    let seed = 0x8c2f_11e6_b197_0d4b;
    static RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );
    unwrap!(spawner.spawn(net_task(runner)));

    let mut button = Button::new(
        PinEdge(Input::new(p.PIN_15, Pull::Up)),
        EmbassyClock,
        ButtonConfig::default(),
    );
    unwrap!(button
        .subscribe(
            |e| matches!(e, ButtonEvent::Clicked { .. } | ButtonEvent::Holding),
            Sink::Queue(BUTTON_EVENTS.dyn_sender()),
        )
        .ok());
    unwrap!(spawner.spawn(button_task(button)));
    unwrap!(spawner.spawn(gesture_task()));

    let ssid = option_env!("WIFI_SSID").unwrap_or("picolink-setup");
    let passphrase = option_env!("WIFI_PASSPHRASE").unwrap_or("");
    let configs = [unwrap!(NetworkConfig::new(ssid, passphrase).ok())];

    let mut manager = ConnectivityManager::new(
        Cyw43Radio::new(control, stack),
        EmbassyClock,
        ManagerConfig::default(),
    );
    static LINK_LOG: StaticCell<fn(&LinkEvent)> = StaticCell::new();
    unwrap!(manager
        .subscribe(|_| true, Sink::Handler(LINK_LOG.init(log_link_event)))
        .ok());

    manager.maintain(&configs).await
}
