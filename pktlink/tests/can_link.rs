use embedded_can::Frame;
use pktlink::{CanLink, ExtendedId, LinkConfig};
use pktlink_interface::{RxCanIo, SplitCanIo, TxCanIo};
use pktlink_mock::{BusHandle, MockCan, MockCanRx, MockCanTx, MockFrame};

type TestLink<'a> = CanLink<'a, MockCanTx, MockCanRx>;

fn ext_id(raw: u32) -> ExtendedId {
    ExtendedId::new(raw).unwrap()
}

/// Pump the link until its transmitter is idle, collecting the CAN frames
/// that arrive at a peer endpoint on the bus.
fn drain_to_bus(link: &mut TestLink<'_>, peer_rx: &mut MockCanRx) -> Vec<MockFrame> {
    let mut frames = Vec::new();
    let mut iterations = 0;
    while !link.is_tx_idle() {
        iterations += 1;
        assert!(iterations < 10_000, "state machine stuck");
        link.task(&mut |_| panic!("unexpected delivery"))
            .expect("task");
        while peer_rx.rx_is_ready() {
            frames.push(peer_rx.try_recv().unwrap());
        }
    }
    frames
}

/// Send wire bytes towards the link as CAN frames under `id`, then pump the
/// link through them.
fn feed_from_bus(
    link: &mut TestLink<'_>,
    peer_tx: &mut MockCanTx,
    id: ExtendedId,
    wire: &[u8],
) -> Vec<Vec<u8>> {
    for chunk in wire.chunks(8) {
        let frame = MockFrame::new(id, chunk).unwrap();
        peer_tx.try_send(&frame).unwrap();
    }
    let mut delivered = Vec::new();
    for _ in 0..wire.len() + 4 {
        link.task(&mut |payload| delivered.push(payload.to_vec()))
            .expect("task");
    }
    delivered
}

#[test]
fn framed_packet_is_sliced_into_identifier_stamped_frames() {
    let bus = BusHandle::new();
    let node = MockCan::new_with_bus(&bus);
    let peer = MockCan::new_with_bus(&bus);
    let (node_tx, node_rx) = node.split();
    let (mut peer_tx, mut peer_rx) = peer.split();

    let cfg = LinkConfig { payload_max: 512 };
    let mut buf_tx = [0u8; 514];
    let mut buf_rx = [0u8; 514];
    let mut link = CanLink::new(node_tx, node_rx, cfg, &mut buf_tx, &mut buf_rx).unwrap();
    link.set_id_rx(ext_id(2));

    let payload = [0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39];
    link.submit(&payload, ext_id(1)).expect("submit");

    let frames = drain_to_bus(&mut link, &mut peer_rx);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].data().len(), 8);
    assert_eq!(frames[1].data().len(), 5);
    for frame in &frames {
        assert_eq!(frame.id(), embedded_can::Id::Extended(ext_id(1)));
    }

    let wire: Vec<u8> = frames.iter().flat_map(|f| f.data().to_vec()).collect();
    assert_eq!(
        wire,
        [0x7E, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x6E, 0x90, 0x7E]
    );

    // The same bytes under the receive identifier deliver the payload back.
    let delivered = feed_from_bus(&mut link, &mut peer_tx, ext_id(2), &wire);
    assert_eq!(delivered, [payload.to_vec()]);
}

#[test]
fn one_can_frame_per_tick_in_each_direction() {
    let bus = BusHandle::new();
    let node = MockCan::new_with_bus(&bus);
    let peer = MockCan::new_with_bus(&bus);
    let (node_tx, node_rx) = node.split();
    let (_peer_tx, mut peer_rx) = peer.split();

    let cfg = LinkConfig { payload_max: 64 };
    let mut buf_tx = [0u8; 66];
    let mut buf_rx = [0u8; 66];
    let mut link = CanLink::new(node_tx, node_rx, cfg, &mut buf_tx, &mut buf_rx).unwrap();

    let payload = [0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39];
    link.submit(&payload, ext_id(1)).expect("submit");

    link.task(&mut |_| ()).unwrap();
    assert!(peer_rx.rx_is_ready());
    assert_eq!(peer_rx.try_recv().unwrap().data().len(), 8);
    assert!(!peer_rx.rx_is_ready());

    link.task(&mut |_| ()).unwrap();
    assert_eq!(peer_rx.try_recv().unwrap().data().len(), 5);
    assert!(link.is_tx_idle());
}

#[test]
fn short_packet_fits_one_frame() {
    let bus = BusHandle::new();
    let node = MockCan::new_with_bus(&bus);
    let peer = MockCan::new_with_bus(&bus);
    let (node_tx, node_rx) = node.split();
    let (_peer_tx, mut peer_rx) = peer.split();

    let cfg = LinkConfig { payload_max: 16 };
    let mut buf_tx = [0u8; 18];
    let mut buf_rx = [0u8; 18];
    let mut link = CanLink::new(node_tx, node_rx, cfg, &mut buf_tx, &mut buf_rx).unwrap();

    link.submit(&[0x00], ext_id(5)).expect("submit");
    let frames = drain_to_bus(&mut link, &mut peer_rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].data(), [0x7E, 0x00, 0x78, 0xF0, 0x7E]);
}

#[test]
fn frames_under_other_identifiers_are_ignored() {
    let bus = BusHandle::new();
    let node = MockCan::new_with_bus(&bus);
    let peer = MockCan::new_with_bus(&bus);
    let (node_tx, node_rx) = node.split();
    let (mut peer_tx, _peer_rx) = peer.split();

    let cfg = LinkConfig { payload_max: 16 };
    let mut buf_tx = [0u8; 18];
    let mut buf_rx = [0u8; 18];
    let mut link = CanLink::new(node_tx, node_rx, cfg, &mut buf_tx, &mut buf_rx).unwrap();
    link.set_id_rx(ext_id(2));

    let wire = [0x7E, 0x00, 0x78, 0xF0, 0x7E];
    let delivered = feed_from_bus(&mut link, &mut peer_tx, ext_id(3), &wire);
    assert!(delivered.is_empty());
    assert_eq!(link.state().sof_count, 0);

    let delivered = feed_from_bus(&mut link, &mut peer_tx, ext_id(2), &wire);
    assert_eq!(delivered, [vec![0x00]]);
}

#[test]
fn transmit_identifier_travels_with_each_submission() {
    let bus = BusHandle::new();
    let node = MockCan::new_with_bus(&bus);
    let peer = MockCan::new_with_bus(&bus);
    let (node_tx, node_rx) = node.split();
    let (_peer_tx, mut peer_rx) = peer.split();

    let cfg = LinkConfig { payload_max: 16 };
    let mut buf_tx = [0u8; 18];
    let mut buf_rx = [0u8; 18];
    let mut link = CanLink::new(node_tx, node_rx, cfg, &mut buf_tx, &mut buf_rx).unwrap();

    link.submit(&[0x01], ext_id(10)).expect("submit");
    let frames = drain_to_bus(&mut link, &mut peer_rx);
    assert!(
        frames
            .iter()
            .all(|f| f.id() == embedded_can::Id::Extended(ext_id(10)))
    );
    assert_eq!(link.id_tx(), ext_id(10));

    link.submit(&[0x02], ext_id(11)).expect("submit");
    let frames = drain_to_bus(&mut link, &mut peer_rx);
    assert!(
        frames
            .iter()
            .all(|f| f.id() == embedded_can::Id::Extended(ext_id(11)))
    );
    assert_eq!(link.id_tx(), ext_id(11));
}

#[test]
fn escape_heavy_packet_survives_chunking() {
    let bus = BusHandle::new();
    let node_a = MockCan::new_with_bus(&bus);
    let node_b = MockCan::new_with_bus(&bus);
    let (a_tx, a_rx) = node_a.split();
    let (b_tx, b_rx) = node_b.split();

    let cfg = LinkConfig { payload_max: 32 };
    let mut buf_a_tx = [0u8; 34];
    let mut buf_a_rx = [0u8; 34];
    let mut buf_b_tx = [0u8; 34];
    let mut buf_b_rx = [0u8; 34];
    let mut link_a = CanLink::new(a_tx, a_rx, cfg, &mut buf_a_tx, &mut buf_a_rx).unwrap();
    let mut link_b = CanLink::new(b_tx, b_rx, cfg, &mut buf_b_tx, &mut buf_b_rx).unwrap();
    link_a.set_id_rx(ext_id(2));
    link_b.set_id_rx(ext_id(1));

    // Every payload byte needs stuffing, so the wire stream is split
    // mid-escape across CAN frame boundaries.
    let payload = [0x7E, 0x7D, 0x7E, 0x7D, 0x7E, 0x7D, 0x7E, 0x7D];
    link_a.submit(&payload, ext_id(1)).expect("submit");

    let mut delivered = Vec::new();
    let mut iterations = 0;
    while delivered.is_empty() {
        iterations += 1;
        assert!(iterations < 10_000, "transfer did not complete");
        link_a.task(&mut |_| panic!("nothing expected at a")).unwrap();
        link_b
            .task(&mut |payload| delivered.push(payload.to_vec()))
            .unwrap();
    }
    assert_eq!(delivered, [payload.to_vec()]);
}

#[test]
fn two_can_links_converse_over_one_bus() {
    let bus = BusHandle::new();
    let node_a = MockCan::new_with_bus(&bus);
    let node_b = MockCan::new_with_bus(&bus);
    let (a_tx, a_rx) = node_a.split();
    let (b_tx, b_rx) = node_b.split();

    let cfg = LinkConfig { payload_max: 64 };
    let mut buf_a_tx = [0u8; 66];
    let mut buf_a_rx = [0u8; 66];
    let mut buf_b_tx = [0u8; 66];
    let mut buf_b_rx = [0u8; 66];
    let mut link_a = CanLink::new(a_tx, a_rx, cfg, &mut buf_a_tx, &mut buf_a_rx).unwrap();
    let mut link_b = CanLink::new(b_tx, b_rx, cfg, &mut buf_b_tx, &mut buf_b_rx).unwrap();
    link_a.set_id_rx(ext_id(2));
    link_b.set_id_rx(ext_id(1));

    let question: Vec<u8> = (0u8..40).collect();
    let answer = [0xDE, 0xAD, 0xBE, 0xEF];
    link_a.submit(&question, ext_id(1)).expect("submit a");
    link_b.submit(&answer, ext_id(2)).expect("submit b");

    let mut got_at_a = Vec::new();
    let mut got_at_b = Vec::new();
    let mut iterations = 0;
    while got_at_a.is_empty() || got_at_b.is_empty() {
        iterations += 1;
        assert!(iterations < 10_000, "conversation did not complete");
        link_a
            .task(&mut |payload| got_at_a = payload.to_vec())
            .expect("task a");
        link_b
            .task(&mut |payload| got_at_b = payload.to_vec())
            .expect("task b");
    }

    assert_eq!(got_at_b, question);
    assert_eq!(got_at_a, answer);
}
