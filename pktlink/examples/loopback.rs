//! Two UART links wired back to back through the in-memory mock driver.
//!
//! Run with: `cargo run --example loopback`

use pktlink::{LinkConfig, UartLink};
use pktlink_interface::SplitByteIo;
use pktlink_mock::MockUart;

fn main() {
    let (north, south) = MockUart::pair();
    let (north_tx, north_rx) = north.split();
    let (south_tx, south_rx) = south.split();

    let cfg = LinkConfig { payload_max: 64 };
    let mut buf_n_tx = [0u8; 66];
    let mut buf_n_rx = [0u8; 66];
    let mut buf_s_tx = [0u8; 66];
    let mut buf_s_rx = [0u8; 66];

    let mut sender =
        UartLink::new(north_tx, north_rx, cfg, &mut buf_n_tx, &mut buf_n_rx).expect("sender");
    let mut receiver =
        UartLink::new(south_tx, south_rx, cfg, &mut buf_s_tx, &mut buf_s_rx).expect("receiver");

    sender.submit(b"hello over the wire").expect("submit");

    let mut received = Vec::new();
    while received.is_empty() {
        sender.task(&mut |_| ()).expect("sender task");
        receiver
            .task(&mut |payload| received = payload.to_vec())
            .expect("receiver task");
    }

    println!("received: {}", String::from_utf8_lossy(&received));
    let state = receiver.state();
    println!(
        "receiver saw {} start-of-frame marks, delivered {} packets",
        state.sof_count, state.rx_packets
    );
}
