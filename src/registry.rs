#![cfg(windows)]

//! HKCU-backed implementation of the installer's key-value store.

use crate::installer::RegistryStore;
use crate::wstr::to_utf16;
use anyhow::Result;
use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_NO_MORE_ITEMS};
use windows::Win32::System::Registry::*;
use windows::core::{PCWSTR, PWSTR};

/// Live registry under the current user's hive.
#[derive(Debug, Default)]
pub struct WinRegistry;

fn create_key(path: &str) -> Result<HKEY> {
    let wide = to_utf16(path);
    let mut hkey = HKEY::default();
    let status = unsafe {
        RegCreateKeyExW(
            HKEY_CURRENT_USER,
            PCWSTR(wide.as_ptr()),
            0,
            None,
            REG_OPTION_NON_VOLATILE,
            KEY_READ | KEY_WRITE,
            None,
            &mut hkey,
            None,
        )
    };
    if status.is_ok() {
        Ok(hkey)
    } else {
        Err(anyhow::anyhow!("RegCreateKeyExW {path} failed: {status:?}"))
    }
}

/// Open an existing key read-only; Ok(None) when it does not exist.
fn open_key(path: &str) -> Result<Option<HKEY>> {
    let wide = to_utf16(path);
    let mut hkey = HKEY::default();
    let status = unsafe {
        RegOpenKeyExW(
            HKEY_CURRENT_USER,
            PCWSTR(wide.as_ptr()),
            0,
            KEY_READ,
            &mut hkey,
        )
    };
    if status.is_ok() {
        Ok(Some(hkey))
    } else if status == ERROR_FILE_NOT_FOUND {
        Ok(None)
    } else {
        Err(anyhow::anyhow!("RegOpenKeyExW {path} failed: {status:?}"))
    }
}

impl RegistryStore for WinRegistry {
    fn set_value(&mut self, key: &str, name: Option<&str>, data: &str) -> Result<()> {
        let hkey = create_key(key)?;
        let wide_name = name.map(to_utf16);
        let value_name = wide_name
            .as_ref()
            .map_or(PCWSTR::null(), |w| PCWSTR(w.as_ptr()));
        let bytes: Vec<u8> = to_utf16(data)
            .into_iter()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        let status = unsafe { RegSetValueExW(hkey, value_name, 0, REG_SZ, Some(&bytes)) };
        let _ = unsafe { RegCloseKey(hkey) };
        if status.is_err() {
            return Err(anyhow::anyhow!("RegSetValueExW {key} failed: {status:?}"));
        }
        Ok(())
    }

    fn delete_value(&mut self, key: &str, name: &str) -> Result<()> {
        let Some(hkey) = open_key_writable(key)? else {
            return Ok(());
        };
        let wide = to_utf16(name);
        let status = unsafe { RegDeleteValueW(hkey, PCWSTR(wide.as_ptr())) };
        let _ = unsafe { RegCloseKey(hkey) };
        if status.is_err() && status != ERROR_FILE_NOT_FOUND {
            return Err(anyhow::anyhow!("RegDeleteValueW {key} failed: {status:?}"));
        }
        Ok(())
    }

    fn subkeys(&self, key: &str) -> Result<Vec<String>> {
        let Some(hkey) = open_key(key)? else {
            return Ok(Vec::new());
        };
        let mut names = Vec::new();
        let result = (|| {
            for index in 0.. {
                let mut buf = [0u16; 256];
                let mut len = buf.len() as u32;
                let status = unsafe {
                    RegEnumKeyExW(
                        hkey,
                        index,
                        PWSTR(buf.as_mut_ptr()),
                        &mut len,
                        None,
                        PWSTR::null(),
                        None,
                        None,
                    )
                };
                if status == ERROR_NO_MORE_ITEMS {
                    break;
                }
                if status.is_err() {
                    return Err(anyhow::anyhow!("RegEnumKeyExW {key} failed: {status:?}"));
                }
                names.push(String::from_utf16_lossy(&buf[..len as usize]));
            }
            Ok(())
        })();
        let _ = unsafe { RegCloseKey(hkey) };
        result.map(|()| names)
    }

    fn delete_key(&mut self, key: &str) -> Result<()> {
        let wide = to_utf16(key);
        let status = unsafe { RegDeleteKeyW(HKEY_CURRENT_USER, PCWSTR(wide.as_ptr())) };
        if status.is_err() && status != ERROR_FILE_NOT_FOUND {
            return Err(anyhow::anyhow!("RegDeleteKeyW {key} failed: {status:?}"));
        }
        Ok(())
    }
}

fn open_key_writable(path: &str) -> Result<Option<HKEY>> {
    let wide = to_utf16(path);
    let mut hkey = HKEY::default();
    let status = unsafe {
        RegOpenKeyExW(
            HKEY_CURRENT_USER,
            PCWSTR(wide.as_ptr()),
            0,
            KEY_READ | KEY_WRITE,
            &mut hkey,
        )
    };
    if status.is_ok() {
        Ok(Some(hkey))
    } else if status == ERROR_FILE_NOT_FOUND {
        Ok(None)
    } else {
        Err(anyhow::anyhow!("RegOpenKeyExW {path} failed: {status:?}"))
    }
}
