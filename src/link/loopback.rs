use std::cell::Cell;
use std::collections::VecDeque;

use link::{
    Error,
    MAX_PACKET_SIZE,
    Link,
    LinkState,
    LvdsLink,
    LvdsReport,
    Result,
    Speed,
    SpeedCode,
};

const DEFAULT_MTU: usize = 16 * 1024;

/// An in-memory link whose transmit side feeds its own receive side.
///
/// Packets sent while the link runs are queued and handed back, one per
/// recv call, in order. Reading with nothing queued returns zero bytes.
/// The loopback records every packet size it sends and receives and every
/// link up/down request, and can simulate a slow handshake or a link that
/// drops on a chosen transfer.
#[derive(Debug)]
pub struct Loopback {
    state: Cell<LinkState>,
    handshake: Option<usize>,
    polls_left: Cell<usize>,
    speed: SpeedCode,
    mtu: usize,
    queue: VecDeque<Vec<u8>>,
    transfers: usize,
    drop_at: Option<usize>,
    sent: Vec<usize>,
    received: Vec<usize>,
    link_requests: Vec<bool>,
}

impl Loopback {
    /// Creates a link which reaches the running state on the first poll
    /// after being enabled.
    pub fn new() -> Loopback {
        Loopback {
            state: Cell::new(LinkState::Ready),
            handshake: Some(0),
            polls_left: Cell::new(0),
            speed: SpeedCode::default(),
            mtu: DEFAULT_MTU,
            queue: VecDeque::new(),
            transfers: 0,
            drop_at: None,
            sent: vec![],
            received: vec![],
            link_requests: vec![],
        }
    }

    /// Reports the connecting state for the given number of polls after the
    /// link is enabled, then runs.
    pub fn with_handshake(mut self, polls: usize) -> Loopback {
        self.handshake = Some(polls);
        self
    }

    /// A link whose peer never answers.
    pub fn without_peer(mut self) -> Loopback {
        self.handshake = None;
        self
    }

    /// # Panics
    ///
    /// Panics if the MTU is 0 or larger than MAX_PACKET_SIZE.
    pub fn with_mtu(mut self, mtu: usize) -> Loopback {
        assert!(
            mtu > 0 && mtu <= MAX_PACKET_SIZE,
            "MTU {} out of range",
            mtu
        );
        self.mtu = mtu;
        self
    }

    /// Drops the link on the n-th (zero based) send or recv call.
    pub fn drop_link_at(&mut self, transfer: usize) {
        self.drop_at = Some(transfer);
    }

    /// Queues a packet for a future recv call.
    pub fn push_packet(&mut self, packet: &[u8]) {
        self.queue.push_back(packet.to_vec());
    }

    /// Sizes of the packets sent so far.
    pub fn sent(&self) -> &[usize] {
        &self.sent
    }

    /// Sizes of the packets received so far.
    pub fn received(&self) -> &[usize] {
        &self.received
    }

    /// Every set_link request in call order.
    pub fn link_requests(&self) -> &[bool] {
        &self.link_requests
    }

    /// Number of send and recv calls made, including failed ones.
    pub fn transfers(&self) -> usize {
        self.transfers
    }

    /// Number of packets waiting to be received.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    fn begin_transfer(&mut self) -> Result<()> {
        let transfer = self.transfers;
        self.transfers += 1;

        if self.state.get() != LinkState::Running {
            return Err(Error::NoLink);
        }

        if self.drop_at == Some(transfer) {
            self.state.set(LinkState::ErrorReset);
            return Err(Error::NoLink);
        }

        Ok(())
    }
}

impl Link for Loopback {
    fn set_link(&mut self, enable: bool) -> Result<()> {
        self.link_requests.push(enable);

        if !enable {
            self.state.set(LinkState::ErrorReset);
        } else if self.state.get() != LinkState::Running {
            self.state.set(LinkState::Started);
            self.polls_left.set(self.handshake.unwrap_or(0));
        }

        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.queue.clear();
        self.state.set(LinkState::ErrorReset);
        Ok(())
    }

    /// Each poll of an enabled link moves the simulated handshake forward.
    fn get_link_state(&self) -> Result<LinkState> {
        let state = self.state.get();

        if state == LinkState::Started || state == LinkState::Connecting {
            let polls_left = self.polls_left.get();
            match self.handshake {
                Some(_) if polls_left == 0 => self.state.set(LinkState::Running),
                Some(_) => {
                    self.polls_left.set(polls_left - 1);
                    self.state.set(LinkState::Connecting);
                }
                None => self.state.set(LinkState::Connecting),
            }
        }

        Ok(self.state.get())
    }

    fn set_tx_speed(&mut self, speed: SpeedCode) -> Result<()> {
        self.speed = speed;
        Ok(())
    }

    fn get_speed(&self) -> Result<Speed> {
        let kbps = (self.speed.mbps() * 1000.0) as u32;
        Ok(Speed {
            tx_kbps: kbps,
            rx_kbps: kbps,
        })
    }

    fn set_mtu(&mut self, mtu: usize) -> Result<()> {
        if mtu == 0 {
            return Err(Error::Unknown("MTU must be positive"));
        }
        if mtu > MAX_PACKET_SIZE {
            return Err(Error::Unknown("MTU exceeds maximum packet size"));
        }
        self.mtu = mtu;
        Ok(())
    }

    fn get_mtu(&self) -> Result<usize> {
        Ok(self.mtu)
    }

    fn send(&mut self, buffer: &[u8]) -> Result<usize> {
        self.begin_transfer()?;

        if buffer.len() > self.mtu {
            return Err(Error::Unknown("Packet exceeds MTU"));
        }

        self.queue.push_back(buffer.to_vec());
        self.sent.push(buffer.len());
        Ok(buffer.len())
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.begin_transfer()?;

        let packet = match self.queue.pop_front() {
            Some(packet) => packet,
            None => return Ok(0),
        };

        if packet.len() > buffer.len() {
            return Err(Error::Unknown("Packet exceeds receive buffer"));
        }

        let len = packet.len();
        buffer[..len].copy_from_slice(&packet);
        self.received.push(len);
        Ok(len)
    }
}

impl LvdsLink for Loopback {
    /// Every sample is reported on every line.
    fn lvds_test(&mut self, iters: u32) -> Result<LvdsReport> {
        Ok(LvdsReport {
            iters,
            s_lvds_0: iters,
            s_lvds_1: iters,
            d_lvds_0: iters,
            d_lvds_1: iters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_takes_polls() {
        let mut link = Loopback::new().with_handshake(2);
        link.set_link(true).unwrap();

        assert_eq!(link.get_link_state().unwrap(), LinkState::Connecting);
        assert_eq!(link.get_link_state().unwrap(), LinkState::Connecting);
        assert_eq!(link.get_link_state().unwrap(), LinkState::Running);
        assert_eq!(link.get_link_state().unwrap(), LinkState::Running);
    }

    #[test]
    fn test_transfer_requires_running_link() {
        let mut link = Loopback::new();
        assert_matches!(link.send(&[0; 4]), Err(Error::NoLink));
        assert_eq!(link.transfers(), 1);
    }

    #[test]
    fn test_packets_loop_back_in_order() {
        let mut link = Loopback::new();
        link.set_link(true).unwrap();
        link.get_link_state().unwrap();

        assert_eq!(link.send(&[1, 2, 3]).unwrap(), 3);
        assert_eq!(link.send(&[4]).unwrap(), 1);

        let mut buffer = [0; 8];
        assert_eq!(link.recv(&mut buffer).unwrap(), 3);
        assert_eq!(&buffer[..3], &[1, 2, 3]);
        assert_eq!(link.recv(&mut buffer).unwrap(), 1);
        assert_eq!(buffer[0], 4);
        assert_eq!(link.recv(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_drop_link() {
        let mut link = Loopback::new();
        link.set_link(true).unwrap();
        link.get_link_state().unwrap();
        link.drop_link_at(1);

        assert!(link.send(&[0; 4]).is_ok());
        assert_matches!(link.send(&[0; 4]), Err(Error::NoLink));
        assert_eq!(link.get_link_state().unwrap(), LinkState::ErrorReset);
        assert_matches!(link.send(&[0; 4]), Err(Error::NoLink));
    }

    #[test]
    fn test_mtu_limits() {
        let mut link = Loopback::new();

        assert_matches!(link.set_mtu(0), Err(Error::Unknown(_)));
        assert_matches!(link.set_mtu(MAX_PACKET_SIZE + 1), Err(Error::Unknown(_)));
        assert_eq!(link.get_mtu().unwrap(), DEFAULT_MTU);

        link.set_mtu(MAX_PACKET_SIZE).unwrap();
        assert_eq!(link.get_mtu().unwrap(), MAX_PACKET_SIZE);
    }

    #[test]
    #[should_panic]
    fn test_with_mtu_over_max() {
        Loopback::new().with_mtu(MAX_PACKET_SIZE + 1);
    }

    #[test]
    fn test_recv_rejects_packet_larger_than_buffer() {
        let mut link = Loopback::new();
        link.set_link(true).unwrap();
        link.get_link_state().unwrap();
        link.push_packet(&[7; 16]);

        let mut buffer = [0; 8];
        assert_matches!(link.recv(&mut buffer), Err(Error::Unknown(_)));
        assert!(link.received().is_empty());
        assert_eq!(buffer, [0; 8]);
    }

    #[test]
    fn test_send_over_mtu() {
        let mut link = Loopback::new().with_mtu(4);
        link.set_link(true).unwrap();
        link.get_link_state().unwrap();

        assert_matches!(link.send(&[0; 5]), Err(Error::Unknown(_)));
    }
}
