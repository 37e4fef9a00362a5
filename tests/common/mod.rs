//! Host-side test doubles: a stepping clock, a scripted radio and a
//! scripted input pin.

use core::future::Future;
use core::net::Ipv4Addr;
use core::pin::pin;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use core::time::Duration;
use std::cell::Cell;
use std::collections::VecDeque;

use heapless::{String as HString, Vec as HVec};

use picolink::config::MAX_SCAN_RESULTS;
use picolink::{
    Clock, EdgeInput, Instant, InterfaceMode, Level, LinkStatus, NetworkConfig, Radio,
    RejectReason, StaticAddress,
};

/// Busy-polls `future` to completion with a no-op waker.
///
/// Every pending poll gives the fakes a chance to advance the clock, so
/// time-driven futures make progress without a real executor.  Panics
/// if the future does not finish within a generous poll budget.
pub fn block_on<F: Future>(future: F) -> F::Output {
    fn raw_waker() -> RawWaker {
        fn clone(_: *const ()) -> RawWaker {
            raw_waker()
        }
        fn noop(_: *const ()) {}
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        RawWaker::new(core::ptr::null(), &VTABLE)
    }
    let waker = unsafe { Waker::from_raw(raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut future = pin!(future);
    for _ in 0..1_000_000 {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
    panic!("future did not complete within the poll budget");
}

/// Clock that advances one millisecond per pending sleep poll.
#[derive(Default)]
pub struct FakeClock {
    now: Cell<u64>,
}

impl FakeClock {
    pub fn new() -> Self {
        FakeClock::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.now.get())
    }

    async fn sleep(&self, duration: Duration) {
        let deadline = self.now.get().saturating_add(duration.as_millis() as u64);
        core::future::poll_fn(|_| {
            if self.now.get() >= deadline {
                Poll::Ready(())
            } else {
                self.advance(1);
                Poll::Pending
            }
        })
        .await
    }
}

/// How a scripted network behaves when attempted.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Report `Connecting` for `after_polls` status polls, then come up.
    Connect { after_polls: u32, address: Ipv4Addr },
    /// Report `Connecting` for `after_polls` status polls, then refuse.
    Reject { after_polls: u32, reason: RejectReason },
    /// Never progress; the attempt runs into its deadline.
    Unreachable,
}

#[derive(Debug, Clone, Copy)]
struct Attempt {
    script: Script,
    polls: u32,
}

/// Scripted [`Radio`] recording everything the manager does to it.
pub struct FakeRadio {
    scripts: Vec<(&'static str, Script)>,
    visible: Vec<&'static str>,
    pub begin_log: Vec<String>,
    pub applied: Vec<StaticAddress>,
    static_results: VecDeque<Result<(), ()>>,
    drop_link_after: Option<u32>,
    attempt: Option<Attempt>,
    connected: Option<Ipv4Addr>,
    in_flight: bool,
}

impl FakeRadio {
    pub fn new() -> Self {
        FakeRadio {
            scripts: Vec::new(),
            visible: Vec::new(),
            begin_log: Vec::new(),
            applied: Vec::new(),
            static_results: VecDeque::new(),
            drop_link_after: None,
            attempt: None,
            connected: None,
            in_flight: false,
        }
    }

    pub fn script(mut self, ssid: &'static str, script: Script) -> Self {
        self.scripts.push((ssid, script));
        self
    }

    pub fn visible(mut self, ssids: &[&'static str]) -> Self {
        self.visible.extend_from_slice(ssids);
        self
    }

    /// Queues the outcome of the next static address application.
    pub fn static_result(mut self, result: Result<(), ()>) -> Self {
        self.static_results.push_back(result);
        self
    }

    /// Drops an established link after this many connected status polls.
    pub fn drop_link_after(mut self, polls: u32) -> Self {
        self.drop_link_after = Some(polls);
        self
    }
}

impl Radio for FakeRadio {
    async fn begin_association(
        &mut self,
        config: &NetworkConfig,
        _mode: InterfaceMode,
    ) -> Result<(), RejectReason> {
        assert!(
            !self.in_flight,
            "association started while another attempt was live"
        );
        self.in_flight = true;
        self.begin_log.push(config.ssid.as_str().to_owned());
        let script = self
            .scripts
            .iter()
            .find(|(ssid, _)| *ssid == config.ssid.as_str())
            .map(|(_, script)| *script)
            .unwrap_or(Script::Unreachable);
        self.attempt = Some(Attempt { script, polls: 0 });
        Ok(())
    }

    fn poll_status(&mut self) -> LinkStatus {
        if let Some(address) = self.connected {
            if let Some(remaining) = self.drop_link_after {
                if remaining == 0 {
                    self.drop_link_after = None;
                    self.connected = None;
                    self.in_flight = false;
                    return LinkStatus::Disassociated;
                }
                self.drop_link_after = Some(remaining - 1);
            }
            return LinkStatus::Connected(address);
        }
        let Some(mut attempt) = self.attempt.take() else {
            return LinkStatus::Disassociated;
        };
        match attempt.script {
            Script::Connect {
                after_polls,
                address,
            } => {
                if attempt.polls >= after_polls {
                    self.connected = Some(address);
                    return LinkStatus::Connected(address);
                }
            }
            Script::Reject { after_polls, reason } => {
                if attempt.polls >= after_polls {
                    return LinkStatus::Rejected(reason);
                }
            }
            Script::Unreachable => {}
        }
        attempt.polls += 1;
        self.attempt = Some(attempt);
        LinkStatus::Connecting
    }

    async fn apply_static_address(&mut self, address: &StaticAddress) -> Result<(), ()> {
        self.applied.push(*address);
        self.static_results.pop_front().unwrap_or(Ok(()))
    }

    async fn disassociate(&mut self) {
        self.attempt = None;
        self.connected = None;
        self.in_flight = false;
    }

    async fn scan(&mut self) -> HVec<HString<32>, MAX_SCAN_RESULTS> {
        let mut ssids = HVec::new();
        for ssid in &self.visible {
            if let Ok(ssid) = HString::try_from(*ssid) {
                if ssids.push(ssid).is_err() {
                    break;
                }
            }
        }
        ssids
    }
}

/// Input pin replaying a schedule of (time, level) edges.
///
/// While an edge is pending the wait future steps the shared clock
/// toward it, so edge waits make progress even without a sleep racing
/// them.
pub struct FakeInput<'c> {
    clock: &'c FakeClock,
    level: Level,
    edges: VecDeque<(u64, Level)>,
}

impl<'c> FakeInput<'c> {
    pub fn new(clock: &'c FakeClock, initial: Level, edges: &[(u64, Level)]) -> Self {
        FakeInput {
            clock,
            level: initial,
            edges: edges.iter().copied().collect(),
        }
    }
}

impl EdgeInput for FakeInput<'_> {
    async fn wait_for_edge(&mut self) {
        core::future::poll_fn(|_| {
            let Some(&(at, level)) = self.edges.front() else {
                return Poll::Pending;
            };
            if self.clock.now_ms() >= at {
                self.edges.pop_front();
                self.level = level;
                Poll::Ready(())
            } else {
                self.clock.advance(1);
                Poll::Pending
            }
        })
        .await
    }

    fn level(&self) -> Level {
        self.level
    }
}
