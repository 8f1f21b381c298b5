use crate::{
    error::CrownError,
    traits::CardBus,
    CID_LEN, CSD_LEN, SSR_LEN,
};

const SD_CMD9: u8 = 9; // SEND_CSD
const SD_CMD10: u8 = 10; // SEND_CID
const SD_CMD13: u8 = 13; // SD_STATUS, app-specific
const SD_CMD55: u8 = 55; // APP_CMD prefix

/// One register-read session against an initialized card.
///
/// Opening gates on the CSD structure version; every read deselects the
/// card before surfacing an error so the bus-select line never dangles.
pub struct RegisterSession<'a, B: CardBus> {
    bus: &'a mut B,
}

impl<'a, B: CardBus> RegisterSession<'a, B> {
    /// Cards reporting anything other than a v1.0 CSD layout are rejected
    /// outright; the downstream loader only parses v1.
    pub fn open(bus: &'a mut B) -> Result<Self, CrownError> {
        if bus.csd_structure_version() != 1 {
            return Err(CrownError::UnsupportedCsdVersion);
        }
        Ok(Self { bus })
    }

    pub fn read_cid(&mut self) -> Result<[u8; CID_LEN], CrownError> {
        self.read_register(SD_CMD10)
    }

    pub fn read_csd(&mut self) -> Result<[u8; CSD_LEN], CrownError> {
        self.read_register(SD_CMD9)
    }

    /// SSR sits behind an app-specific command: CMD55 arms it, CMD13
    /// answers with R2, which carries one extra status byte ahead of the
    /// 64-byte payload.
    pub fn read_ssr(&mut self) -> Result<[u8; SSR_LEN], CrownError> {
        if self.command(SD_CMD55)? != 0 {
            self.bus.deselect();
            return Err(CrownError::RegisterRead);
        }
        if self.command(SD_CMD13)? != 0 {
            self.bus.deselect();
            return Err(CrownError::RegisterRead);
        }
        if self.bus.skip_filler().is_err() {
            self.bus.deselect();
            return Err(CrownError::RegisterRead);
        }
        let mut out = [0u8; SSR_LEN];
        self.payload(&mut out)?;
        Ok(out)
    }

    fn read_register<const N: usize>(&mut self, cmd: u8) -> Result<[u8; N], CrownError> {
        if self.command(cmd)? != 0 {
            self.bus.deselect();
            return Err(CrownError::RegisterRead);
        }
        let mut out = [0u8; N];
        self.payload(&mut out)?;
        Ok(out)
    }

    fn command(&mut self, cmd: u8) -> Result<u8, CrownError> {
        match self.bus.send_command(cmd, 0) {
            Ok(status) => Ok(status),
            Err(_) => {
                self.bus.deselect();
                Err(CrownError::RegisterRead)
            }
        }
    }

    fn payload(&mut self, out: &mut [u8]) -> Result<(), CrownError> {
        match self.bus.read_payload(out) {
            Ok(()) => Ok(()),
            Err(_) => {
                self.bus.deselect();
                Err(CrownError::RegisterRead)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct FakeBus {
        pub csd_structure: u8,
        /// R1 status handed back per command number.
        pub fail_cmd: Option<u8>,
        pub cid: [u8; CID_LEN],
        pub csd: [u8; CSD_LEN],
        pub ssr: [u8; SSR_LEN],
        pub commands: Vec<u8>,
        pub fillers_skipped: usize,
        pub deselects: usize,
        pub selected: bool,
    }

    impl FakeBus {
        pub(crate) fn new() -> Self {
            Self {
                csd_structure: 1,
                fail_cmd: None,
                cid: [0x11; CID_LEN],
                csd: [0x22; CSD_LEN],
                ssr: [0x33; SSR_LEN],
                commands: Vec::new(),
                fillers_skipped: 0,
                deselects: 0,
                selected: false,
            }
        }
    }

    impl CardBus for FakeBus {
        type Error = ();

        fn csd_structure_version(&self) -> u8 {
            self.csd_structure
        }

        fn send_command(&mut self, cmd: u8, _arg: u32) -> Result<u8, ()> {
            self.commands.push(cmd);
            self.selected = true;
            if self.fail_cmd == Some(cmd) {
                Ok(0x05)
            } else {
                Ok(0x00)
            }
        }

        fn read_payload(&mut self, out: &mut [u8]) -> Result<(), ()> {
            let source: &[u8] = match out.len() {
                SSR_LEN => &self.ssr,
                _ => match self.commands.last() {
                    Some(&SD_CMD10) => &self.cid,
                    _ => &self.csd,
                },
            };
            out.copy_from_slice(&source[..out.len()]);
            self.selected = false;
            Ok(())
        }

        fn skip_filler(&mut self) -> Result<(), ()> {
            self.fillers_skipped += 1;
            Ok(())
        }

        fn deselect(&mut self) {
            self.deselects += 1;
            self.selected = false;
        }
    }

    #[test]
    fn open_rejects_non_v1_csd() {
        let mut bus = FakeBus::new();
        bus.csd_structure = 2;
        let err = RegisterSession::open(&mut bus).err();
        assert_eq!(err, Some(CrownError::UnsupportedCsdVersion));
    }

    #[test]
    fn reads_cid_csd_ssr_with_expected_commands() {
        let mut bus = FakeBus::new();
        let mut session = RegisterSession::open(&mut bus).unwrap();
        let cid = session.read_cid().unwrap();
        let csd = session.read_csd().unwrap();
        let ssr = session.read_ssr().unwrap();
        assert_eq!(cid, [0x11; CID_LEN]);
        assert_eq!(csd, [0x22; CSD_LEN]);
        assert_eq!(ssr, [0x33; SSR_LEN]);
        assert_eq!(bus.commands, vec![SD_CMD10, SD_CMD9, SD_CMD55, SD_CMD13]);
        assert_eq!(bus.fillers_skipped, 1);
        assert_eq!(bus.deselects, 0);
    }

    #[test]
    fn failed_status_deselects_before_error() {
        let mut bus = FakeBus::new();
        bus.fail_cmd = Some(SD_CMD10);
        let mut session = RegisterSession::open(&mut bus).unwrap();
        let err = session.read_cid().err();
        assert_eq!(err, Some(CrownError::RegisterRead));
        assert_eq!(bus.deselects, 1);
        assert!(!bus.selected);
    }

    #[test]
    fn failed_app_prefix_skips_status_command() {
        let mut bus = FakeBus::new();
        bus.fail_cmd = Some(SD_CMD55);
        let mut session = RegisterSession::open(&mut bus).unwrap();
        let err = session.read_ssr().err();
        assert_eq!(err, Some(CrownError::RegisterRead));
        assert_eq!(bus.commands, vec![SD_CMD55]);
        assert_eq!(bus.deselects, 1);
    }
}
