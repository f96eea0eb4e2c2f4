pub mod compare;
pub mod triage;
pub mod tune;

pub const INPUT_ERROR_EXIT_CODE: i32 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GateOutcome {
    Pass,
    Fail,
}

impl GateOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
        }
    }
}
