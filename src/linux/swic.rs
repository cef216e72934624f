use std;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use libc;

use link::{
    Error,
    Link,
    LinkState,
    LvdsLink,
    LvdsReport,
    Request,
    Result,
    Speed,
    SpeedCode,
};
use linux::ioctl::*;

/// A SpaceWire interface exposed by the kernel as a character device,
/// e.g. /dev/spacewire0.
///
/// Reads and writes move whole packets. The device stays open, and holds
/// the link, until the Swic is dropped.
pub struct Swic {
    fd: libc::c_int,
}

impl Swic {
    /// Opens the device for reading and writing.
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Swic> {
        let path = path.as_ref();
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;

        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDWR) };

        if fd == -1 {
            return Err(std::io::Error::last_os_error());
        }

        debug!("Opened {} as fd {}.", path.display(), fd);

        Ok(Swic { fd })
    }

    /// Issues a request which takes its argument by value.
    fn ioctl_with_value(
        &self,
        request: Request,
        code: libc::c_ulong,
        value: libc::c_ulong,
    ) -> Result<()> {
        if unsafe { libc::ioctl(self.fd, code as _, value) } == -1 {
            return Err(Error::Control(request, std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Issues a request which reads and/or writes through a pointer.
    fn ioctl_with_ptr<T>(&self, request: Request, code: libc::c_ulong, arg: &mut T) -> Result<()> {
        if unsafe { libc::ioctl(self.fd, code as _, arg as *mut T) } == -1 {
            return Err(Error::Control(request, std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Classifies the error left behind by a failed read or write.
    fn transfer_error() -> Error {
        let err = std::io::Error::last_os_error();

        if err.raw_os_error() == Some(libc::ENOLINK) {
            Error::NoLink
        } else {
            Error::IO(err)
        }
    }
}

impl Link for Swic {
    fn set_link(&mut self, enable: bool) -> Result<()> {
        self.ioctl_with_value(
            Request::SetLink(enable),
            SWICIOC_SET_LINK,
            enable as libc::c_ulong,
        )
    }

    fn reset(&mut self) -> Result<()> {
        self.ioctl_with_value(Request::Reset, SWICIOC_RESET, 0)
    }

    fn get_link_state(&self) -> Result<LinkState> {
        let mut raw: libc::c_int = 0;
        self.ioctl_with_ptr(Request::GetLinkState, SWICIOC_GET_LINK_STATE, &mut raw)?;
        LinkState::from_raw(raw as u32).ok_or(Error::Unknown("Unknown link state"))
    }

    fn set_tx_speed(&mut self, speed: SpeedCode) -> Result<()> {
        self.ioctl_with_value(
            Request::SetTxSpeed,
            SWICIOC_SET_TX_SPEED,
            speed.code() as libc::c_ulong,
        )
    }

    fn get_speed(&self) -> Result<Speed> {
        let mut speed = c_swic_speed::default();
        self.ioctl_with_ptr(Request::GetSpeed, SWICIOC_GET_SPEED, &mut speed)?;
        Ok(Speed {
            tx_kbps: speed.tx,
            rx_kbps: speed.rx,
        })
    }

    fn set_mtu(&mut self, mtu: usize) -> Result<()> {
        self.ioctl_with_value(Request::SetMtu, SWICIOC_SET_MTU, mtu as libc::c_ulong)
    }

    fn get_mtu(&self) -> Result<usize> {
        let mut mtu: libc::c_ulong = 0;
        self.ioctl_with_ptr(Request::GetMtu, SWICIOC_GET_MTU, &mut mtu)?;
        Ok(mtu as usize)
    }

    fn send(&mut self, buffer: &[u8]) -> Result<usize> {
        let wrote = unsafe {
            libc::write(
                self.fd,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len(),
            )
        };

        if wrote == -1 {
            return Err(Self::transfer_error());
        }

        Ok(wrote as usize)
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let read = unsafe {
            libc::read(
                self.fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
            )
        };

        if read == -1 {
            return Err(Self::transfer_error());
        }

        Ok(read as usize)
    }
}

impl LvdsLink for Swic {
    fn lvds_test(&mut self, iters: u32) -> Result<LvdsReport> {
        let mut test = c_swic_lvds_test {
            iters,
            ..Default::default()
        };

        self.ioctl_with_ptr(Request::LvdsTest, SWICIOC_LVDS_TEST, &mut test)?;

        Ok(LvdsReport {
            iters: test.iters,
            s_lvds_0: test.s_lvds_0,
            s_lvds_1: test.s_lvds_1,
            d_lvds_0: test.d_lvds_0,
            d_lvds_1: test.d_lvds_1,
        })
    }
}

impl Drop for Swic {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
