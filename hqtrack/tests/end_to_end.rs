//! Whole sessions over an in-memory connection

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::time::{timeout, Instant};

use hqtrack::{
    Behavior, Clock, Dialect, DuplexTransport, FixedClock, FrameDecoder, Packet, Simulator,
    SimulatorConfig, WorkingMode,
};

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 7)
        .and_then(|d| d.and_hms_opt(9, 30, 5))
        .unwrap()
}

/// Clock that follows tokio's (possibly paused) time from a fixed start
#[derive(Debug)]
struct TokioClock {
    base: NaiveDateTime,
    start: Instant,
}

impl TokioClock {
    fn new() -> Self {
        Self {
            base: base_time(),
            start: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = chrono::Duration::from_std(self.start.elapsed()).unwrap();
        self.base + elapsed
    }
}

/// Server end of the connection
struct Server {
    stream: DuplexStream,
    decoder: FrameDecoder,
}

impl Server {
    fn new(stream: DuplexStream) -> Self {
        Self {
            stream,
            decoder: FrameDecoder::new(),
        }
    }

    async fn send(&mut self, text: &str) {
        self.stream.write_all(text.as_bytes()).await.unwrap();
    }

    /// Next packet from the device, or `None` if nothing arrives in time
    async fn recv(&mut self, within: Duration) -> Option<Packet> {
        let deadline = Instant::now() + within;
        loop {
            if let Some(frame) = self.decoder.next_frame() {
                return Some(Packet::from_frame(&frame).unwrap());
            }

            let mut buf = [0u8; 512];
            let n = tokio::time::timeout_at(deadline, self.stream.read(&mut buf))
                .await
                .ok()?
                .unwrap();
            if n == 0 {
                return None;
            }
            // Buffer only; frames are taken at the top of the loop
            drop(self.decoder.feed(&buf[..n]));
        }
    }

    async fn expect(&mut self) -> Packet {
        self.recv(Duration::from_secs(10))
            .await
            .expect("device sent nothing")
    }

    /// Everything the device sends until it closes the connection
    async fn drain(mut self) -> Vec<Packet> {
        let mut bytes = Vec::new();
        self.stream.read_to_end(&mut bytes).await.unwrap();
        self.decoder
            .feed(&bytes)
            .map(|frame| Packet::from_frame(&frame).unwrap())
            .collect()
    }
}

fn config(dialect: Dialect) -> SimulatorConfig {
    SimulatorConfig::new("memory", 0, dialect)
        .with_read_timeout(Duration::from_millis(200))
        .with_behavior(Behavior::reports_only())
        .with_seed(3)
}

async fn start(config: SimulatorConfig, clock: Arc<dyn Clock>) -> (Simulator, Server) {
    let (transport, server) = DuplexTransport::pair(64 * 1024);
    let mut sim = Simulator::with_transport(config, Box::new(transport)).with_clock(clock);
    sim.start().await.unwrap();
    (sim, Server::new(server))
}

fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(base_time()))
}

#[tokio::test]
async fn test_set_upload_interval() {
    let (mut sim, mut server) = start(config(Dialect::Autoseeker), fixed_clock()).await;

    server.send("*HQ,8168000005,D1,093000,015,1#").await;
    let ack = server.expect().await;

    assert_eq!(ack.field(2), Some("V4"));
    assert_eq!(ack.field(3), Some("D1"));
    assert_eq!(ack.field(4), Some("015"));
    assert_eq!(
        ack.render(),
        "*HQ,8168000005,V4,D1,015,65535,093000,093005,A,2234.9,N,11354.4,E,00.00,000,070324,FFFFBBFF,460,00,10342,3721#"
    );

    let state = sim.device().snapshot();
    assert_eq!(state.status.upload_interval_secs(), 15);
    assert_eq!(state.status.acc_status, 1);

    // Exactly one acknowledgment
    assert!(server.recv(Duration::from_millis(300)).await.is_none());

    sim.stop().await.unwrap();
}

#[tokio::test]
async fn test_fuel_cut_then_restore() {
    let (mut sim, mut server) = start(config(Dialect::Autoseeker), fixed_clock()).await;

    server.send("*HQ,8168000005,S20,093000,1,0101#").await;
    let ack = server.expect().await;
    assert_eq!(ack.field(3), Some("S20"));
    assert_eq!(ack.field(4), Some("DONE"));
    assert!(sim.device().snapshot().status.fuel_cut);

    server.send("*HQ,8168000005,S20,093000,0#").await;
    let ack = server.expect().await;
    assert_eq!(ack.field(4), Some("OK"));
    assert!(!sim.device().snapshot().status.fuel_cut);

    sim.stop().await.unwrap();
}

#[tokio::test]
async fn test_bad_input_is_skipped() {
    let (mut sim, mut server) = start(config(Dialect::Autoseeker), fixed_clock()).await;
    let before = sim.device().snapshot();

    // Malformed, unknown code, bad field, then a good command split across writes
    server.send("*onlyonefield#").await;
    server.send("*HQ,8168000005,XYZ,093000#").await;
    server.send("*HQ,8168000005,D1,093000,abc#").await;
    server.send("*HQ,8168000005,R7,09").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    server.send("3000#").await;

    let ack = server.expect().await;
    assert_eq!(ack.field(3), Some("R7"));
    assert_eq!(ack.field(4), Some("093000"));
    assert_eq!(sim.device().snapshot(), before);
    assert_eq!(sim.session().frames_received(), 4);

    sim.stop().await.unwrap();
}

#[tokio::test]
async fn test_heartbeat_confirmation_gets_no_reply() {
    let (mut sim, mut server) = start(config(Dialect::Autoseeker), fixed_clock()).await;

    server.send("*HQ,8168000005,R12,093000#").await;
    assert!(server.recv(Duration::from_millis(300)).await.is_none());

    sim.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_realtime_reports_every_interval() {
    let (transport, server) = DuplexTransport::pair(64 * 1024);
    let mut sim = Simulator::with_transport(config(Dialect::Gt06), Box::new(transport))
        .with_clock(Arc::new(TokioClock::new()));
    sim.device().lock().status.set_upload_interval(1).unwrap();

    sim.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(5500)).await;
    sim.stop().await.unwrap();

    let packets = Server::new(server).drain().await;
    assert_eq!(packets[0].render(), "*HQ,865205030330012,V0#");

    let reports: Vec<&Packet> = packets.iter().filter(|p| p.field(2) == Some("V1")).collect();
    assert!((4..=6).contains(&reports.len()), "{} reports", reports.len());

    let times: Vec<&str> = reports.iter().filter_map(|p| p.timestamp()).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]), "{times:?}");
    assert_eq!(times[0], "093006");
}

#[tokio::test(start_paused = true)]
async fn test_restart_logs_in_again() {
    let (transport, server) = DuplexTransport::pair(64 * 1024);
    let mut sim = Simulator::with_transport(config(Dialect::Gt06), Box::new(transport))
        .with_clock(Arc::new(TokioClock::new()));
    sim.device().lock().status.working_mode = WorkingMode::DeepSleep;

    sim.start().await.unwrap();
    let mut server = Server::new(server);

    assert_eq!(server.expect().await.field(2), Some("V0"));

    let sent_at = Instant::now();
    server.send("*HQ,865205030330012,R1,093000#").await;

    let ack = server.expect().await;
    assert_eq!(ack.field(3), Some("R1"));
    assert_eq!(ack.field(4), Some("DONE"));

    let login = server.expect().await;
    assert_eq!(login.render(), "*HQ,865205030330012,V0#");
    assert!(sent_at.elapsed() >= Duration::from_secs(2));
    assert!(sim.session().is_logged_in());

    sim.stop().await.unwrap();
}

#[tokio::test]
async fn test_server_close_ends_session() {
    let (mut sim, server) = start(config(Dialect::Autoseeker), fixed_clock()).await;
    drop(server);

    timeout(Duration::from_secs(2), sim.wait()).await.unwrap();
    assert!(!sim.is_connected());
}
