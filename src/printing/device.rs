//! Printer adapters for raw ESC/POS data.
//!
//! - network printers (raw TCP, port 9100)
//! - USB printers through their device node
//! - queues of the system spooler (`lp`)

use crate::errors::{AppError, AppResult};
use crate::models::printer::{ConnectionType, Printer};
use std::fs::OpenOptions;
use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const DEFAULT_PORT: u16 = 9100;
const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

pub trait PrinterDevice: Send {
    /// Send raw ESC/POS bytes.
    fn print(&self, data: &[u8]) -> AppResult<()>;

    fn is_online(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct NetworkDevice {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkDevice {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.trim().to_string(),
            port,
            timeout: Duration::from_secs(3),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve(&self) -> AppResult<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| AppError::Printer(format!("{}:{}: {e}", self.host, self.port)))?
            .next()
            .ok_or_else(|| AppError::Printer(format!("Invalid address: {}:{}", self.host, self.port)))
    }
}

impl PrinterDevice for NetworkDevice {
    #[instrument(skip(self, data), fields(host = %self.host, port = self.port, data_len = data.len()))]
    fn print(&self, data: &[u8]) -> AppResult<()> {
        let addr = self.resolve()?;
        info!("Connecting to printer");

        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| AppError::Printer(format!("{addr}: {e}")))?;
        stream.set_write_timeout(Some(self.timeout))?;

        stream
            .write_all(data)
            .map_err(|e| AppError::Printer(format!("Write failed on {addr}: {e}")))?;
        stream.flush()?;

        info!("Print job sent");
        Ok(())
    }

    #[instrument(skip(self), fields(host = %self.host, port = self.port))]
    fn is_online(&self) -> bool {
        let Ok(addr) = self.resolve() else {
            warn!("Address does not resolve");
            return false;
        };
        match TcpStream::connect_timeout(&addr, PROBE_TIMEOUT) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Printer offline");
                false
            }
        }
    }
}

/// USB printer exposed by the kernel as a character device.
#[derive(Debug, Clone)]
pub struct UsbDevice {
    path: PathBuf,
}

impl UsbDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PrinterDevice for UsbDevice {
    #[instrument(skip(self, data), fields(path = %self.path.display(), data_len = data.len()))]
    fn print(&self, data: &[u8]) -> AppResult<()> {
        let mut dev = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| AppError::Printer(format!("{}: {e}", self.path.display())))?;
        dev.write_all(data)
            .map_err(|e| AppError::Printer(format!("{}: {e}", self.path.display())))?;
        dev.flush()?;
        info!("Print job sent");
        Ok(())
    }

    fn is_online(&self) -> bool {
        self.path.exists()
            && OpenOptions::new().write(true).open(&self.path).is_ok()
    }
}

/// Queue of the system spooler, fed in raw mode.
#[derive(Debug, Clone)]
pub struct SystemDevice {
    queue: String,
}

impl SystemDevice {
    pub fn new(queue: &str) -> Self {
        Self {
            queue: queue.trim().to_string(),
        }
    }
}

impl PrinterDevice for SystemDevice {
    #[instrument(skip(self, data), fields(queue = %self.queue, data_len = data.len()))]
    fn print(&self, data: &[u8]) -> AppResult<()> {
        let mut child = Command::new("lp")
            .args(["-d", &self.queue, "-o", "raw"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::Printer(format!("Cannot run lp: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(data)?;
        }

        let out = child.wait_with_output()?;
        if !out.status.success() {
            return Err(AppError::Printer(format!(
                "lp -d {}: {}",
                self.queue,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        info!("Print job queued");
        Ok(())
    }

    fn is_online(&self) -> bool {
        Command::new("lpstat")
            .args(["-p", &self.queue])
            .output()
            .map(|o| o.status.success() && !String::from_utf8_lossy(&o.stdout).contains("disabled"))
            .unwrap_or(false)
    }
}

/// Build the adapter matching a stored printer row.
pub fn device_for(printer: &Printer, timeout: Duration) -> AppResult<Box<dyn PrinterDevice>> {
    match printer.connection {
        ConnectionType::Network => {
            let host = printer
                .ip_address
                .as_deref()
                .filter(|h| !h.trim().is_empty())
                .ok_or_else(|| AppError::Printer(format!("'{}' has no IP address", printer.name)))?;
            let port = printer.port.unwrap_or(DEFAULT_PORT);
            Ok(Box::new(NetworkDevice::new(host, port).with_timeout(timeout)))
        }
        ConnectionType::Usb => {
            let path = printer
                .device_path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| AppError::Printer(format!("'{}' has no device path", printer.name)))?;
            Ok(Box::new(UsbDevice::new(path)))
        }
        ConnectionType::System => Ok(Box::new(SystemDevice::new(&printer.name))),
    }
}

/// A printer found by [`scan`].
#[derive(Debug, Clone, PartialEq)]
pub struct Discovered {
    pub name: String,
    pub connection: ConnectionType,
    pub device_path: Option<String>,
}

/// USB printer device nodes (`lp*`) under `dir`.
pub fn scan_usb_nodes(dir: &Path) -> Vec<Discovered> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut out: Vec<Discovered> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("lp"))
        })
        .map(|p| Discovered {
            name: format!(
                "USB {}",
                p.file_name().and_then(|n| n.to_str()).unwrap_or_default()
            ),
            connection: ConnectionType::Usb,
            device_path: Some(p.display().to_string()),
        })
        .collect();

    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Queue names from `lpstat -p` output.
pub fn parse_lpstat(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|l| l.strip_prefix("printer "))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

fn scan_spooler() -> Vec<Discovered> {
    match Command::new("lpstat").arg("-p").output() {
        Ok(out) => parse_lpstat(&String::from_utf8_lossy(&out.stdout))
            .into_iter()
            .map(|name| Discovered {
                name,
                connection: ConnectionType::System,
                device_path: None,
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "lpstat not available");
            Vec::new()
        }
    }
}

/// Everything attached locally: USB device nodes and spooler queues.
pub fn scan() -> Vec<Discovered> {
    let mut found = scan_usb_nodes(Path::new("/dev/usb"));
    found.extend(scan_spooler());
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::printer::PrinterStatus;
    use std::io::Read;
    use std::net::TcpListener;

    #[test]
    fn lpstat_output_is_parsed() {
        let out = "printer Kitchen is idle.  enabled since Mon 01 Jan\n\
                   printer Bar_Epson disabled since Tue\n\
                   some other line\n";
        assert_eq!(parse_lpstat(out), vec!["Kitchen", "Bar_Epson"]);
    }

    #[test]
    fn network_device_sends_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let reader = std::thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            s.read_to_end(&mut buf).unwrap();
            buf
        });

        let dev = NetworkDevice::new("127.0.0.1", port);
        dev.print(b"\x1b@hello").unwrap();
        drop(dev);

        assert_eq!(reader.join().unwrap(), b"\x1b@hello");
    }

    #[test]
    fn usb_device_writes_to_its_node() {
        let path = std::env::temp_dir().join("fastpos_fake_lp0");
        std::fs::write(&path, b"").unwrap();

        let dev = UsbDevice::new(&path);
        assert!(dev.is_online());
        dev.print(b"ticket").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"ticket");

        std::fs::remove_file(&path).ok();
        assert!(!dev.is_online());
    }

    #[test]
    fn scan_finds_lp_nodes_only() {
        let dir = std::env::temp_dir().join("fastpos_scan_usb");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("lp0"), b"").unwrap();
        std::fs::write(dir.join("hiddev0"), b"").unwrap();

        let found = scan_usb_nodes(&dir);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "USB lp0");
        assert_eq!(found[0].connection, ConnectionType::Usb);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn network_printer_without_ip_has_no_device() {
        let p = Printer {
            id: 1,
            name: "Kitchen".into(),
            connection: ConnectionType::Network,
            ip_address: None,
            port: None,
            vendor_id: None,
            product_id: None,
            device_path: None,
            categories: vec![],
            status: PrinterStatus::Offline,
        };
        assert!(device_for(&p, Duration::from_secs(1)).is_err());
    }
}
