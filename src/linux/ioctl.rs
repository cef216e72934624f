#![allow(non_camel_case_types)]

use std::mem;

use libc;

// https://elixir.bootlin.com/linux/latest/source/include/uapi/asm-generic/ioctl.h
const IOC_NRBITS: u32 = 8;

const IOC_TYPEBITS: u32 = 8;

const IOC_SIZEBITS: u32 = 14;

const IOC_NRSHIFT: u32 = 0;

const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;

const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;

const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

const IOC_NONE: u32 = 0;

const IOC_WRITE: u32 = 1;

const IOC_READ: u32 = 2;

const fn ioc(dir: u32, nr: u32, size: usize) -> libc::c_ulong {
    ((dir << IOC_DIRSHIFT) | (SWIC_IOC_TYPE << IOC_TYPESHIFT) | (nr << IOC_NRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)) as libc::c_ulong
}

/// Magic shared by every request of the SpaceWire driver.
const SWIC_IOC_TYPE: u32 = b'w' as u32;

pub const SWICIOC_SET_LINK: libc::c_ulong = ioc(IOC_WRITE, 1, mem::size_of::<libc::c_int>());

pub const SWICIOC_SET_TX_SPEED: libc::c_ulong =
    ioc(IOC_WRITE, 2, mem::size_of::<libc::c_int>());

pub const SWICIOC_SET_MTU: libc::c_ulong = ioc(IOC_WRITE, 3, mem::size_of::<libc::c_int>());

pub const SWICIOC_GET_LINK_STATE: libc::c_ulong =
    ioc(IOC_READ, 4, mem::size_of::<libc::c_int>());

pub const SWICIOC_GET_SPEED: libc::c_ulong = ioc(IOC_READ, 5, mem::size_of::<c_swic_speed>());

pub const SWICIOC_GET_MTU: libc::c_ulong = ioc(IOC_READ, 6, mem::size_of::<libc::c_ulong>());

pub const SWICIOC_RESET: libc::c_ulong = ioc(IOC_NONE, 7, 0);

pub const SWICIOC_LVDS_TEST: libc::c_ulong =
    ioc(IOC_READ | IOC_WRITE, 8, mem::size_of::<c_swic_lvds_test>());

/// struct elvees_swic_speed, rates in kbit/s.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct c_swic_speed {
    pub tx: libc::c_uint,
    pub rx: libc::c_uint,
}

/// struct elvees_swic_lvds_test
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct c_swic_lvds_test {
    pub iters: libc::c_uint,
    pub s_lvds_0: libc::c_uint,
    pub s_lvds_1: libc::c_uint,
    pub d_lvds_0: libc::c_uint,
    pub d_lvds_1: libc::c_uint,
}
