//! Simulated device session
//!
//! A [`Simulator`] connects once, sends the login packet (GT06), then runs
//! two tasks until the connection ends:
//!
//! - the inbound loop reads from the transport, reassembles frames and
//!   dispatches each command, sending its reply
//! - the outbound loop sleeps for the scheduler's delay and sends whatever
//!   the tick produced
//!
//! Both share the device state behind one mutex and the writer half behind
//! an async mutex. Packets of one loop go out in the order produced; the two
//! loops may interleave. Either loop ending (EOF, read or write failure,
//! [`Simulator::stop`]) cancels the other.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hqtrack_core::{Dialect, Frame, FrameDecoder, Packet, Session};
use hqtrack_transport::{TcpTransport, Transport, TransportReader, TransportWriter};
use hqtrack_types::{Clock, SystemClock};

use crate::config::SimulatorConfig;
use crate::device::{DeviceState, SharedDevice};
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::report;
use crate::telemetry::TelemetryScheduler;

/// One simulated tracker connected to one server
///
/// # Examples
///
/// ```no_run
/// use hqtrack::{Dialect, Simulator, SimulatorConfig};
///
/// #[tokio::main]
/// async fn main() -> hqtrack::Result<()> {
///     let config = SimulatorConfig::new("localhost", 8888, Dialect::Gt06);
///     let mut sim = Simulator::new(config);
///
///     sim.start().await?;
///     sim.wait().await;
///     Ok(())
/// }
/// ```
pub struct Simulator {
    config: SimulatorConfig,
    transport: Option<Box<dyn Transport>>,
    clock: Arc<dyn Clock>,
    device: SharedDevice,
    session: Session,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    outbound: Option<Outbound>,
}

impl Simulator {
    /// Simulator talking TCP to `config.host:config.port`
    pub fn new(config: SimulatorConfig) -> Self {
        let transport = TcpTransport::new(config.host.clone(), config.port)
            .with_connect_timeout(config.connect_timeout)
            .with_write_timeout(config.write_timeout);
        Self::with_transport(config, Box::new(transport))
    }

    /// Simulator over a caller-supplied transport
    pub fn with_transport(config: SimulatorConfig, transport: Box<dyn Transport>) -> Self {
        let device = SharedDevice::new(DeviceState::new(config.dialect, config.device_id.clone()));
        Self {
            config,
            transport: Some(transport),
            clock: Arc::new(SystemClock),
            device,
            session: Session::new(),
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
            outbound: None,
        }
    }

    /// Replace the wall clock used for packet timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Shared device state
    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Connect, log in and start both loops
    ///
    /// # Errors
    ///
    /// Transport errors from connecting or sending the login packet, or
    /// [`Error::AlreadyRunning`] on a second call.
    pub async fn start(&mut self) -> Result<()> {
        let mut transport = self.transport.take().ok_or(Error::AlreadyRunning)?;
        let dialect = self.config.dialect;

        info!(
            "Connecting {} device {} to {}...",
            dialect,
            self.config.device_id,
            transport.remote_addr()
        );

        transport.connect().await?;
        let (reader, writer) = transport.into_split()?;
        self.session.initialize()?;

        info!("Connected");

        let outbound = Outbound::new(writer, self.session.clone(), self.cancel.clone());

        if dialect == Dialect::Gt06 {
            outbound.send(&report::login(&self.config.device_id)).await?;
            self.session.login()?;
            info!("Login sent");
        }

        let inbound_loop = InboundLoop {
            reader,
            decoder: FrameDecoder::new(),
            dispatcher: Dispatcher::new(dialect),
            device: self.device.clone(),
            clock: Arc::clone(&self.clock),
            outbound: outbound.clone(),
            session: self.session.clone(),
            cancel: self.cancel.clone(),
            read_timeout: self.config.read_timeout,
        };

        let outbound_loop = OutboundLoop {
            scheduler: TelemetryScheduler::new(
                dialect,
                self.config.behavior.clone(),
                self.config.seed,
            ),
            device: self.device.clone(),
            clock: Arc::clone(&self.clock),
            outbound: outbound.clone(),
            cancel: self.cancel.clone(),
            backoff: self.config.behavior.error_backoff,
        };

        self.tasks.push(tokio::spawn(inbound_loop.run()));
        self.tasks.push(tokio::spawn(outbound_loop.run()));
        self.outbound = Some(outbound);

        Ok(())
    }

    /// Wait until both loops have ended
    ///
    /// Cancel safe: a task is forgotten only once it has finished.
    pub async fn wait(&mut self) {
        while let Some(task) = self.tasks.first_mut() {
            let result = task.await;
            self.tasks.remove(0);
            if let Err(e) = result {
                warn!("Session task failed: {}", e);
            }
        }
    }

    /// Stop both loops and close the connection
    pub async fn stop(&mut self) -> Result<()> {
        info!("Disconnecting...");

        self.cancel.cancel();
        self.wait().await;

        if let Some(outbound) = self.outbound.take() {
            outbound.shutdown().await;
        }
        self.session.close();

        info!("Disconnected");
        Ok(())
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("dialect", &self.config.dialect)
            .field("device_id", &self.config.device_id)
            .field("session", &self.session.state())
            .finish()
    }
}

/// Writer half shared by both loops
#[derive(Clone)]
struct Outbound {
    writer: Arc<AsyncMutex<Box<dyn TransportWriter>>>,
    session: Session,
    cancel: CancellationToken,
}

impl Outbound {
    fn new(writer: Box<dyn TransportWriter>, session: Session, cancel: CancellationToken) -> Self {
        Self {
            writer: Arc::new(AsyncMutex::new(writer)),
            session,
            cancel,
        }
    }

    /// Send one packet; a failed or timed-out write ends the session
    ///
    /// Gives up as soon as the session is cancelled, so a peer that stopped
    /// reading cannot hold the writer past [`Simulator::stop`].
    async fn send(&self, packet: &Packet) -> Result<()> {
        if !self.session.is_connected() {
            return Err(Error::NotConnected);
        }

        let wire = packet.render();
        let result = tokio::select! {
            _ = self.cancel.cancelled() => return Err(Error::NotConnected),
            result = async { self.writer.lock().await.send(wire.as_bytes()).await } => result,
        };

        match result {
            Ok(()) => {
                debug!("-> {}", wire);
                self.session.record_sent();
                Ok(())
            }
            Err(e) => {
                warn!("Failed to send {}: {}", wire, e);
                self.disconnect();
                Err(e.into())
            }
        }
    }

    /// Mark the session disconnected and stop both loops
    fn disconnect(&self) {
        if self.session.close() {
            info!("Session disconnected");
        }
        self.cancel.cancel();
    }

    async fn shutdown(&self) {
        if let Err(e) = self.writer.lock().await.shutdown().await {
            debug!("Shutdown of write half failed: {}", e);
        }
    }
}

struct InboundLoop {
    reader: Box<dyn TransportReader>,
    decoder: FrameDecoder,
    dispatcher: Dispatcher,
    device: SharedDevice,
    clock: Arc<dyn Clock>,
    outbound: Outbound,
    session: Session,
    cancel: CancellationToken,
    read_timeout: Duration,
}

impl InboundLoop {
    async fn run(mut self) {
        loop {
            let received = tokio::select! {
                _ = self.cancel.cancelled() => break,
                received = self.reader.receive(self.read_timeout) => received,
            };

            let bytes = match received {
                Ok(bytes) => bytes,
                Err(e) if e.is_timeout() => continue,
                Err(hqtrack_transport::Error::ConnectionClosed) => {
                    info!("Connection closed by server");
                    break;
                }
                Err(e) => {
                    warn!("Receive error: {}", e);
                    break;
                }
            };

            let frames: Vec<Frame> = self.decoder.feed(&bytes).collect();
            for frame in frames {
                if self.cancel.is_cancelled() {
                    break;
                }
                self.handle_frame(frame).await;
            }
        }

        self.outbound.disconnect();
        debug!("Inbound loop finished");
    }

    async fn handle_frame(&mut self, frame: Frame) {
        debug!("<- {}", frame);
        self.session.record_frame();

        let packet = match Packet::from_frame(&frame) {
            Ok(packet) => packet,
            Err(e) => {
                debug!("Dropping frame: {}", e);
                return;
            }
        };

        let now = self.clock.now();
        let result = {
            let mut state = self.device.lock();
            self.dispatcher.dispatch(&packet, &mut state, now)
        };

        let reply = match result {
            Ok(Some(reply)) => reply,
            Ok(None) => return,
            Err(hqtrack_core::Error::UnknownCommand(code)) => {
                warn!("Unknown command {:?}: {}", code, frame);
                return;
            }
            Err(e) => {
                warn!("Command rejected: {}", e);
                return;
            }
        };

        if self.outbound.send(&reply.packet).await.is_err() {
            return;
        }

        if let Some(follow_up) = reply.follow_up {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = sleep(follow_up.delay) => {}
            }

            if self.outbound.send(&follow_up.packet).await.is_ok() {
                info!("Restarted, login sent");
                if let Err(e) = self.session.login() {
                    debug!("Login not recorded: {}", e);
                }
            }
        }
    }
}

struct OutboundLoop {
    scheduler: TelemetryScheduler,
    device: SharedDevice,
    clock: Arc<dyn Clock>,
    outbound: Outbound,
    cancel: CancellationToken,
    backoff: Duration,
}

impl OutboundLoop {
    async fn run(mut self) {
        'session: loop {
            let delay = {
                let state = self.device.lock();
                self.scheduler.next_delay(&state)
            };

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep(delay) => {}
            }

            let now = self.clock.now();
            let ticked = {
                let mut state = self.device.lock();
                self.scheduler.tick(&mut state, now)
            };

            match ticked {
                Ok(packets) => {
                    for packet in &packets {
                        if self.outbound.send(packet).await.is_err() {
                            break 'session;
                        }
                    }
                }
                Err(e) => {
                    warn!("Telemetry tick failed: {}", e);
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = sleep(self.backoff) => {}
                    }
                }
            }
        }

        debug!("Outbound loop finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Behavior;
    use hqtrack_transport::DuplexTransport;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn config(dialect: Dialect) -> SimulatorConfig {
        SimulatorConfig::new("memory", 0, dialect)
            .with_read_timeout(Duration::from_millis(50))
            .with_behavior(Behavior::reports_only())
            .with_seed(1)
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let (transport, _server) = DuplexTransport::pair(4096);
        let mut sim = Simulator::with_transport(config(Dialect::Autoseeker), Box::new(transport));

        sim.start().await.unwrap();
        assert!(sim.is_connected());
        assert!(matches!(sim.start().await, Err(Error::AlreadyRunning)));

        sim.stop().await.unwrap();
        assert!(!sim.is_connected());
    }

    #[tokio::test]
    async fn test_gt06_logs_in_on_start() {
        let (transport, mut server) = DuplexTransport::pair(4096);
        let mut sim = Simulator::with_transport(config(Dialect::Gt06), Box::new(transport));

        sim.start().await.unwrap();
        assert!(sim.session().is_logged_in());

        let mut buf = [0u8; 23];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"*HQ,865205030330012,V0#");
        sim.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_peer_drops_session() {
        // The server end is kept open but never read, so the pipe fills up
        let (transport, _server) = DuplexTransport::pair(64);
        let transport = transport.with_write_timeout(Duration::from_secs(2));
        let mut sim = Simulator::with_transport(config(Dialect::Autoseeker), Box::new(transport));
        sim.device().lock().status.set_upload_interval(1).unwrap();

        sim.start().await.unwrap();
        sleep(Duration::from_secs(10)).await;
        assert!(!sim.is_connected());

        tokio::time::timeout(Duration::from_secs(5), sim.stop())
            .await
            .expect("stop returns after a write timeout")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_blocked_write() {
        let (transport, _server) = DuplexTransport::pair(64);
        let transport = transport.with_write_timeout(Duration::from_secs(3600));
        let mut sim = Simulator::with_transport(config(Dialect::Autoseeker), Box::new(transport));
        sim.device().lock().status.set_upload_interval(1).unwrap();

        sim.start().await.unwrap();
        sleep(Duration::from_secs(3)).await;
        assert!(sim.is_connected());

        tokio::time::timeout(Duration::from_secs(5), sim.stop())
            .await
            .expect("stop does not wait on a blocked write")
            .unwrap();
        assert!(!sim.is_connected());
    }

    #[tokio::test]
    async fn test_eof_ends_session() {
        let (transport, mut server) = DuplexTransport::pair(4096);
        let mut sim = Simulator::with_transport(config(Dialect::Autoseeker), Box::new(transport));

        sim.start().await.unwrap();
        server.shutdown().await.unwrap();
        drop(server);

        sim.wait().await;
        assert!(!sim.is_connected());
    }
}
