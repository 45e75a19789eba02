#![no_std]
#![no_main]

extern crate alloc;

use embassy_net::{Config, Runner, Stack, StackResources};
use embassy_time::Delay;
use embassy_usb::class::hid::{self, HidWriter};
use embassy_usb::{Builder, UsbDevice};
use esp_hal::Blocking;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Pull};
use esp_hal::otg_fs::{self, Usb};
use esp_hal::rmt::{Channel, Rmt, TxChannelConfig, TxChannelCreator};
use esp_hal::rng::Rng;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal_embassy::Executor;
use esp_println::println;
use esp_wifi::wifi::{self, WifiDevice};
use log::{error, info};
use static_cell::StaticCell;

use vision_board::activity::EnablePin;
use vision_board::config;
use vision_board::led_strip::RmtLedStrip;
use vision_board::network::BoardNetwork;
use vision_board::usb_hid::UsbMouse;
use vision_board::wifi::WiFiManager;
use vision_board::mdns;
use vision_core::ControlLoop;
use vision_core::config::NUM_LEDS;
use vision_core::report::{MOUSE_REPORT_DESCRIPTOR, MOUSE_REPORT_SIZE};

// Add app descriptor for espflash compatibility
esp_bootloader_esp_idf::esp_app_desc!();

type UsbDriver = otg_fs::asynch::Driver<'static>;
type StatusStrip = RmtLedStrip<Channel<Blocking, 0>, NUM_LEDS>;
type Board = ControlLoop<
    BoardNetwork<'static>,
    UsbMouse<'static, UsbDriver>,
    StatusStrip,
    Delay,
    EnablePin<Input<'static>>,
>;

static WIFI_INIT_CELL: StaticCell<esp_wifi::EspWifiController<'static>> = StaticCell::new();
static STACK_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
static TCP_RX_BUFFER: StaticCell<[u8; config::TCP_RX_BUFFER]> = StaticCell::new();
static TCP_TX_BUFFER: StaticCell<[u8; config::TCP_TX_BUFFER]> = StaticCell::new();

static EP_OUT_BUFFER: StaticCell<[u8; 1024]> = StaticCell::new();
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
static HID_STATE: StaticCell<hid::State<'static>> = StaticCell::new();

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("[PANIC] {}", info);
    loop {}
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

#[embassy_executor::task]
async fn mdns_task(stack: Stack<'static>, host: &'static str) {
    mdns::run_responder(stack, host).await;
    error!("[MDNS] Responder stopped");
}

#[embassy_executor::task]
async fn control_task(board: Board) -> ! {
    board.run().await
}

#[esp_hal::main]
fn main() -> ! {
    // Level comes from ESP_LOG at build time
    esp_println::logger::init_logger_from_env();

    let device_config = config::device_config();
    if let Err(e) = device_config.validate() {
        panic!("[MAIN] Invalid device configuration: {:?}", e);
    }

    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    // esp-wifi needs a heap
    esp_alloc::heap_allocator!(size: config::HEAP_SIZE);

    let timer_group0 = TimerGroup::new(peripherals.TIMG0);
    esp_hal_embassy::init(timer_group0.timer0);

    // WiFi + embassy-net with DHCP
    let timer_group1 = TimerGroup::new(peripherals.TIMG1);
    let mut rng = Rng::new(peripherals.RNG);
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());
    let wifi_init = WIFI_INIT_CELL.init(
        esp_wifi::init(timer_group1.timer0, rng, peripherals.RADIO_CLK)
            .expect("[WIFI] Driver init failed"),
    );
    let (wifi_controller, wifi_interfaces) =
        wifi::new(wifi_init, peripherals.WIFI).expect("[WIFI] Controller init failed");

    let (stack, runner) = embassy_net::new(
        wifi_interfaces.sta,
        Config::dhcpv4(Default::default()),
        STACK_RESOURCES.init(StackResources::new()),
        seed,
    );
    let network = BoardNetwork::new(
        WiFiManager::new(wifi_controller, stack),
        stack,
        TCP_RX_BUFFER.init([0; config::TCP_RX_BUFFER]),
        TCP_TX_BUFFER.init([0; config::TCP_TX_BUFFER]),
        device_config.server_port,
    );
    info!("[WIFI] Network stack ready, port {}", device_config.server_port);

    // WS2812 strip on RMT channel 0 at 10 MHz
    let rmt = Rmt::new(peripherals.RMT, Rate::from_mhz(10)).expect("[LED] RMT init failed");
    let tx_config = TxChannelConfig::default()
        .with_clk_divider(1)
        .with_idle_output_level(Level::Low)
        .with_idle_output(false)
        .with_carrier_modulation(false);
    let channel = rmt
        .channel0
        .configure(peripherals.GPIO6, tx_config)
        .expect("[LED] RMT channel config failed");
    let strip = StatusStrip::new(channel, device_config.strip.brightness);
    info!("[LED] Strip on GPIO{}", config::LED_DATA_PIN);

    // USB HID mouse on the OTG port (D+ GPIO20, D- GPIO19)
    let usb = Usb::new(peripherals.USB0, peripherals.GPIO20, peripherals.GPIO19);
    let driver = otg_fs::asynch::Driver::new(
        usb,
        EP_OUT_BUFFER.init([0; 1024]),
        otg_fs::asynch::Config::default(),
    );
    let mut usb_config = embassy_usb::Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [],
        CONTROL_BUFFER.init([0; 64]),
    );
    let hid_config = hid::Config {
        report_descriptor: MOUSE_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: 10,
        max_packet_size: 8,
    };
    let writer = HidWriter::<_, MOUSE_REPORT_SIZE>::new(
        &mut builder,
        HID_STATE.init(hid::State::new()),
        hid_config,
    );
    let usb_device = builder.build();
    let mouse = UsbMouse::new(writer);

    // Activity enable switch, off unless driven high
    let switch = EnablePin::new(Input::new(
        peripherals.GPIO7,
        InputConfig::default().with_pull(Pull::Down),
    ));
    info!("[MAIN] Activity switch on GPIO{}", config::ACTIVITY_PIN);

    let board = Board::new(&device_config, network, mouse, strip, Delay, switch);

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        info!("[MAIN] Spawning tasks...");
        spawner.must_spawn(net_task(runner));
        spawner.must_spawn(usb_task(usb_device));
        spawner.must_spawn(mdns_task(stack, device_config.discovery_name));
        spawner.must_spawn(control_task(board));
    });
}
