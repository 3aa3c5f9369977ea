//! Frequency update control
//!
//! Chooses between a fractional (smooth tune) update and a full reprogram,
//! tracks whether the chip is online, and recovers after the chip drops off
//! the bus.

use log::{debug, info, warn};

use crate::{
    bus::BusPresence,
    config::Config,
    errors::*,
    frequency::{CrystalFrequency, Frequency, Ppm},
    register::RegisterImage,
    smooth::is_small_change,
    synth::Synthesizer,
};

/// Which update path was taken
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    /// Dividers searched, full freeze / write / unfreeze / apply sequence
    Full,
    /// Only RFREQ rewritten, cached dividers
    Fractional,
}

/// Result of a frequency request
pub type UpdateOutcome = Result<UpdateKind, Error>;

/// Read only view of the controller
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SynthesizerState {
    /// Frequency of the last successful update, `None` before the first one
    pub last_programmed: Option<Frequency>,
    /// Last update went through and the chip is on the bus
    pub online: bool,
}

/// Centre of the smooth tune window and the dividers programmed with it
#[derive(Debug, Copy, Clone)]
struct Anchor<D> {
    center: Frequency,
    dividers: D,
}


/// Synthesizer controller
pub struct SynthesisController<S, P>
where S: Synthesizer,
{
    synth: S,
    presence: P,
    crystal: CrystalFrequency,
    smooth_tune_ppm: Ppm,
    requested: Frequency,
    state: SynthesizerState,
    anchor: Option<Anchor<S::Dividers>>,
}

impl<S, P> SynthesisController<S, P>
where S: Synthesizer,
      P: BusPresence,
{
    /// Creates an offline controller. Nothing is sent until the first
    /// request or poll.
    pub fn new(synth: S, presence: P, config: &Config) -> Self {
        SynthesisController {
            synth,
            presence,
            crystal: config.crystal,
            smooth_tune_ppm: config.smooth_tune_ppm,
            requested: config.startup_frequency,
            state: SynthesizerState::default(),
            anchor: None,
        }
    }

    /// Give back the backend and the presence check
    pub fn release(self) -> (S, P) {
        (self.synth, self.presence)
    }

    pub fn synthesizer(&self) -> &S {
        &self.synth
    }

    pub fn synthesizer_mut(&mut self) -> &mut S {
        &mut self.synth
    }

    pub fn presence(&self) -> &P {
        &self.presence
    }

    pub fn presence_mut(&mut self) -> &mut P {
        &mut self.presence
    }

    /// Snapshot of the last programmed frequency and online flag
    pub fn current_state(&self) -> SynthesizerState {
        self.state
    }

    /// Last frequency asked for, programmed or not
    pub fn requested_frequency(&self) -> Frequency {
        self.requested
    }

    pub fn crystal_frequency(&self) -> CrystalFrequency {
        self.crystal
    }

    /// New crystal calibration, used from the next conversion on.
    /// The chip isn't touched.
    pub fn set_crystal_frequency(&mut self, xtal: CrystalFrequency) {
        self.crystal = xtal;
    }

    pub fn smooth_tune_ppm(&self) -> Ppm {
        self.smooth_tune_ppm
    }

    /// New smooth tune window, 0 disables smooth tuning.
    pub fn set_smooth_tune_ppm(&mut self, ppm: Ppm) {
        self.smooth_tune_ppm = ppm;
    }

    /// Frequency programmed by a raw register image, using the current crystal.
    /// No bus access, `None` if the image is beyond the 11.21 range.
    pub fn decode_register_image(&self, image: &RegisterImage) -> Option<Frequency> {
        image.decode(self.crystal)
    }

    /// Tunes to the frequency a raw register image stands for.
    /// An image that doesn't decode changes nothing.
    pub fn request_register_image(&mut self, image: &RegisterImage) -> UpdateOutcome {
        match self.decode_register_image(image) {
            Some(target) => self.request_frequency(target),
            None => {
                warn!("register image {:02x?} out of range", image.to_bytes());
                Err(Error::UnrepresentableFrequency)
            }
        }
    }

    /// Tunes to `target`.
    ///
    /// Within the smooth tune window of the last full update only the
    /// fractional part is rewritten, anything else reprograms the dividers.
    pub fn request_frequency(&mut self, target: Frequency) -> UpdateOutcome {
        self.requested = target;

        if !self.presence.is_present() {
            self.lose_presence();
            return Err(Error::BusAbsent);
        }

        let smooth = self
            .anchor
            .filter(|a| is_small_change(a.center, target, self.smooth_tune_ppm));

        match smooth {
            Some(anchor) => self.update_fractional(target, anchor.dividers),
            None => self.update_full(target),
        }
    }

    /// Call from the main loop.
    ///
    /// Marks the chip offline when it drops off the bus, and reprograms the
    /// last requested frequency (the startup frequency at first) when it comes
    /// back or hasn't been programmed yet.
    pub fn poll(&mut self) -> Option<UpdateOutcome> {
        if !self.presence.is_present() {
            self.lose_presence();
            None
        } else if !self.state.online {
            // nothing on the chip can be trusted, no smooth tune
            self.anchor = None;
            let outcome = self.request_frequency(self.requested);
            if outcome.is_ok() {
                info!("synthesizer online at {}", self.requested);
            }
            Some(outcome)
        } else {
            None
        }
    }

    fn lose_presence(&mut self) {
        if self.state.online {
            warn!("synthesizer bus not present, going offline");
        }
        self.state.online = false;
        self.anchor = None;
    }

    fn update_full(&mut self, target: Frequency) -> UpdateOutcome {
        let dividers = match self.synth.plan(target, self.crystal) {
            Some(d) => d,
            None => {
                warn!("no divider setting for {}", target);
                return Err(Error::UnrepresentableFrequency);
            }
        };
        debug!("full update to {} with {:?}", target, dividers);

        match self.synth.load_full(target, dividers, self.crystal) {
            Ok(()) => {
                self.anchor = Some(Anchor { center: target, dividers });
                self.programmed(target);
                Ok(UpdateKind::Full)
            }
            Err(e) => Err(self.failed(e)),
        }
    }

    fn update_fractional(&mut self, target: Frequency, dividers: S::Dividers) -> UpdateOutcome {
        debug!("smooth tune to {}", target);

        match self.synth.load_fractional(target, dividers, self.crystal) {
            Ok(()) => {
                self.programmed(target);
                Ok(UpdateKind::Fractional)
            }
            Err(e) => Err(self.failed(e)),
        }
    }

    fn programmed(&mut self, target: Frequency) {
        self.state.last_programmed = Some(target);
        self.state.online = true;
    }

    /// Chip contents are unknown until the next full update
    fn failed(&mut self, e: Error) -> Error {
        warn!("synthesizer update failed: {}", e);
        self.state.online = false;
        self.anchor = None;
        e
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Load {
        Full(Frequency, u32),
        Fractional(Frequency, u32),
    }

    /// Dividers are the target in whole MHz, nothing below 4 MHz
    #[derive(Default)]
    struct FakeSynth {
        loads: Vec<Load>,
        fail: bool,
    }

    impl Synthesizer for FakeSynth {
        type Dividers = u32;

        fn plan(&self, target: Frequency, _: CrystalFrequency) -> Option<u32> {
            Some(target.whole_mhz()).filter(|&m| m >= 4)
        }

        fn load_full(&mut self, t: Frequency, d: u32, _: CrystalFrequency) -> Result<(), Error> {
            if self.fail {
                return Err(Error::BusTransaction);
            }
            self.loads.push(Load::Full(t, d));
            Ok(())
        }

        fn load_fractional(&mut self, t: Frequency, d: u32, _: CrystalFrequency) -> Result<(), Error> {
            if self.fail {
                return Err(Error::BusTransaction);
            }
            self.loads.push(Load::Fractional(t, d));
            Ok(())
        }
    }

    struct FakePresence(Cell<bool>);

    impl BusPresence for FakePresence {
        fn is_present(&self) -> bool {
            self.0.get()
        }
    }

    fn controller() -> SynthesisController<FakeSynth, FakePresence> {
        SynthesisController::new(
            FakeSynth::default(),
            FakePresence(Cell::new(true)),
            &Config::default(),
        )
    }

    fn mhz(f: f64) -> Frequency {
        Frequency::from_mhz(f)
    }

    #[test]
    fn starts_offline() {
        let c = controller();
        assert_eq!(c.current_state(), SynthesizerState { last_programmed: None, online: false });
        assert_eq!(c.requested_frequency(), Frequency(crate::constants::DEFAULT_FREQ));
    }

    #[test]
    fn first_request_is_full_then_smooth() {
        let mut c = controller();
        assert_eq!(c.request_frequency(mhz(100.0)), Ok(UpdateKind::Full));
        assert_eq!(c.request_frequency(mhz(100.00035)), Ok(UpdateKind::Fractional));
        assert_eq!(c.request_frequency(mhz(100.1)), Ok(UpdateKind::Full));

        assert_eq!(
            c.synthesizer().loads,
            vec![
                Load::Full(mhz(100.0), 100),
                Load::Fractional(mhz(100.00035), 100),
                Load::Full(mhz(100.1), 100),
            ]
        );
        assert_eq!(
            c.current_state(),
            SynthesizerState { last_programmed: Some(mhz(100.1)), online: true }
        );
    }

    #[test]
    fn smooth_window_stays_centred_on_last_full_update() {
        let mut c = controller();
        c.request_frequency(mhz(100.0)).unwrap();
        // about 11 kHz either side at 100 MHz, measured from 100.0
        for step in 1..=5 {
            let f = mhz(100.0 + 0.002 * step as f64);
            assert_eq!(c.request_frequency(f), Ok(UpdateKind::Fractional));
        }
        // 2 kHz from the last step but outside the window
        assert_eq!(c.request_frequency(mhz(100.012)), Ok(UpdateKind::Full));
        assert_eq!(c.request_frequency(mhz(100.014)), Ok(UpdateKind::Fractional));
    }

    #[test]
    fn zero_ppm_always_full() {
        let mut c = controller();
        c.set_smooth_tune_ppm(Ppm(0));
        assert_eq!(c.request_frequency(mhz(50.0)), Ok(UpdateKind::Full));
        assert_eq!(c.request_frequency(mhz(50.0)), Ok(UpdateKind::Full));
    }

    #[test]
    fn unrepresentable_leaves_state_alone() {
        let mut c = controller();
        c.request_frequency(mhz(10.0)).unwrap();
        let before = c.current_state();

        assert_eq!(c.request_frequency(mhz(1.0)), Err(Error::UnrepresentableFrequency));
        assert_eq!(c.current_state(), before);
        assert_eq!(c.synthesizer().loads.len(), 1);
        assert_eq!(c.requested_frequency(), mhz(1.0));

        // smooth tune window still there
        assert_eq!(c.request_frequency(mhz(10.0001)), Ok(UpdateKind::Fractional));
    }

    #[test]
    fn absent_bus_sends_nothing() {
        let mut c = controller();
        c.request_frequency(mhz(10.0)).unwrap();
        c.presence().0.set(false);

        assert_eq!(c.request_frequency(mhz(10.0001)), Err(Error::BusAbsent));
        assert!(!c.current_state().online);
        assert_eq!(c.current_state().last_programmed, Some(mhz(10.0)));
        assert_eq!(c.synthesizer().loads.len(), 1);

        // back on the bus, no smooth tune from the stale anchor
        c.presence().0.set(true);
        assert_eq!(c.request_frequency(mhz(10.0001)), Ok(UpdateKind::Full));
    }

    #[test]
    fn bus_failure_goes_offline_and_forces_full() {
        let mut c = controller();
        c.request_frequency(mhz(10.0)).unwrap();

        c.synthesizer_mut().fail = true;
        assert_eq!(c.request_frequency(mhz(10.0001)), Err(Error::BusTransaction));
        assert_eq!(
            c.current_state(),
            SynthesizerState { last_programmed: Some(mhz(10.0)), online: false }
        );

        c.synthesizer_mut().fail = false;
        assert_eq!(c.request_frequency(mhz(10.0002)), Ok(UpdateKind::Full));
        assert!(c.current_state().online);
    }

    #[test]
    fn poll_programs_startup_frequency_once() {
        let mut c = controller();
        assert_eq!(c.poll(), Some(Ok(UpdateKind::Full)));
        assert_eq!(c.poll(), None);
        assert_eq!(
            c.synthesizer().loads,
            vec![Load::Full(Frequency(crate::constants::DEFAULT_FREQ), 28)]
        );
    }

    #[test]
    fn poll_recovers_last_request() {
        let mut c = controller();
        c.request_frequency(mhz(20.0)).unwrap();

        c.presence().0.set(false);
        assert_eq!(c.poll(), None);
        assert!(!c.current_state().online);
        assert_eq!(c.poll(), None);

        c.presence().0.set(true);
        assert_eq!(c.poll(), Some(Ok(UpdateKind::Full)));
        assert_eq!(c.synthesizer().loads.last(), Some(&Load::Full(mhz(20.0), 20)));
        assert_eq!(c.poll(), None);
    }

    #[test]
    fn poll_retries_after_failure() {
        let mut c = controller();
        c.synthesizer_mut().fail = true;
        assert_eq!(c.poll(), Some(Err(Error::BusTransaction)));
        assert_eq!(c.poll(), Some(Err(Error::BusTransaction)));
        c.synthesizer_mut().fail = false;
        assert_eq!(c.poll(), Some(Ok(UpdateKind::Full)));
    }

    #[test]
    fn register_image_requests_use_current_crystal() {
        use crate::divider;

        let mut c = controller();
        let f = mhz(28.2);
        let image = RegisterImage::encode(f, divider::search(f).unwrap(), c.crystal_frequency());
        assert_eq!(c.decode_register_image(&image), Some(f));
        assert_eq!(c.request_register_image(&image), Ok(UpdateKind::Full));
        assert_eq!(c.current_state().last_programmed, Some(f));

        // a recalibrated crystal changes what the same registers mean
        c.set_crystal_frequency(CrystalFrequency::from_mhz(114.3));
        assert_ne!(c.decode_register_image(&image), Some(f));
    }

    #[test]
    fn register_image_beyond_range_is_rejected() {
        let mut c = controller();
        c.request_frequency(mhz(10.0)).unwrap();
        let state = c.current_state();

        let image = RegisterImage::from_bytes([0x00, 0x3F, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(c.decode_register_image(&image), None);
        assert_eq!(c.request_register_image(&image), Err(Error::UnrepresentableFrequency));

        assert_eq!(c.current_state(), state);
        assert_eq!(c.requested_frequency(), mhz(10.0));
        assert_eq!(c.synthesizer().loads.len(), 1);
    }
}
