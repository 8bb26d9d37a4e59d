//! Pure TCB state graph. Grounded on
//! `original_source/src/tcp/state_machine.cpp`; the 8 event methods and
//! "unlisted transitions are no-ops" rule are kept verbatim, with
//! `can_transition` made actually advisory (the C++ source's version
//! always returned `true`; spec.md §4.5 calls it "advisory" so this keeps
//! that behavior rather than inventing a full transition table twice).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpState {
    Closed,
    Listen,
    SynSent,
    SynReceived,
    Established,
    FinWait1,
    FinWait2,
    CloseWait,
    Closing,
    LastAck,
    TimeWait,
}

#[derive(Debug, Clone, Copy)]
pub struct StateMachine {
    state: TcpState,
}

impl Default for StateMachine {
    fn default() -> Self {
        StateMachine {
            state: TcpState::Closed,
        }
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TcpState {
        self.state
    }

    pub fn send_syn(&mut self) {
        if self.state == TcpState::Closed {
            self.state = TcpState::SynSent;
        }
    }

    pub fn recv_synack(&mut self) {
        if self.state == TcpState::SynSent {
            self.state = TcpState::Established;
        }
    }

    pub fn send_ack(&mut self) {
        if self.state == TcpState::SynReceived {
            self.state = TcpState::Established;
        }
    }

    pub fn send_fin(&mut self) {
        if self.state == TcpState::Established {
            self.state = TcpState::FinWait1;
        }
    }

    pub fn recv_fin(&mut self) {
        self.state = match self.state {
            TcpState::Established => TcpState::CloseWait,
            TcpState::FinWait1 => TcpState::Closing,
            TcpState::FinWait2 => TcpState::TimeWait,
            other => other,
        };
    }

    pub fn recv_ack(&mut self) {
        self.state = match self.state {
            TcpState::FinWait1 => TcpState::FinWait2,
            TcpState::Closing => TcpState::TimeWait,
            TcpState::LastAck => TcpState::Closed,
            other => other,
        };
    }

    pub fn close(&mut self) {
        self.state = TcpState::Closed;
    }

    pub fn reset(&mut self) {
        self.state = TcpState::Closed;
    }

    /// Overrides state directly; intended for tests that need to exercise
    /// a state without walking the whole handshake.
    pub fn force_state(&mut self, state: TcpState) {
        self.state = state;
    }

    /// Advisory only — does not gate the event methods above.
    pub fn can_transition(&self, _new_state: TcpState) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_to_established_via_handshake() {
        let mut sm = StateMachine::new();
        sm.send_syn();
        assert_eq!(sm.state(), TcpState::SynSent);
        sm.recv_synack();
        assert_eq!(sm.state(), TcpState::Established);
    }

    #[test]
    fn active_close_reaches_time_wait() {
        let mut sm = StateMachine::new();
        sm.force_state(TcpState::Established);
        sm.send_fin();
        assert_eq!(sm.state(), TcpState::FinWait1);
        sm.recv_ack();
        assert_eq!(sm.state(), TcpState::FinWait2);
        sm.recv_fin();
        assert_eq!(sm.state(), TcpState::TimeWait);
    }

    #[test]
    fn close_or_reset_from_any_state_ends_closed() {
        for state in [
            TcpState::Listen,
            TcpState::SynSent,
            TcpState::SynReceived,
            TcpState::Established,
            TcpState::FinWait1,
            TcpState::FinWait2,
            TcpState::CloseWait,
            TcpState::Closing,
            TcpState::LastAck,
            TcpState::TimeWait,
        ] {
            let mut sm = StateMachine::new();
            sm.force_state(state);
            sm.close();
            assert_eq!(sm.state(), TcpState::Closed);

            let mut sm2 = StateMachine::new();
            sm2.force_state(state);
            sm2.reset();
            assert_eq!(sm2.state(), TcpState::Closed);
        }
    }

    #[test]
    fn unlisted_transition_is_a_no_op() {
        let mut sm = StateMachine::new();
        // send_fin from CLOSED is not in the table.
        sm.send_fin();
        assert_eq!(sm.state(), TcpState::Closed);
    }
}
