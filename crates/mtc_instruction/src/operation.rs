#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    // Arithmetic
    ADD, // Add
    SUB, // Subtract
    MUL, // Multiply A by the operand
    DIV, // Divide A by the operand

    // Stack
    PUSH,  // Push
    PUSHF, // Push flags
    PUSHA, // Push all general and index registers
    POP,   // Pop
    POPF,  // Pop flags
    POPA,  // Pop all general and index registers

    // Logic
    AND, // And
    OR,  // Or
    XOR, // Exclusive or
    INC, // Increment
    DEC, // Decrement

    // Control transfer
    JMP, // Unconditional jump
    JA,  // Jump on above (carry and zero clear)
    JB,  // Jump on below (carry set)
    JE,  // Jump on equal (alias JZ)
    JNE, // Jump on not equal (alias JNZ)
    JZ,  // Jump on zero
    JNZ, // Jump on not zero

    NOP, // No operation

    CMP, // Compare

    // Shift and rotate
    SHL, // Shift logical left
    SHR, // Shift logical right
    ROL, // Rotate left
    ROR, // Rotate right

    NOT, // Invert
    MOV, // Move
}

impl Operation {
    /// Every operation in catalog declaration order.
    pub const ALL: [Operation; 30] = [
        Operation::ADD,
        Operation::SUB,
        Operation::MUL,
        Operation::DIV,
        Operation::PUSH,
        Operation::PUSHF,
        Operation::PUSHA,
        Operation::POP,
        Operation::POPF,
        Operation::POPA,
        Operation::AND,
        Operation::OR,
        Operation::XOR,
        Operation::INC,
        Operation::DEC,
        Operation::JMP,
        Operation::JA,
        Operation::JB,
        Operation::JE,
        Operation::JNE,
        Operation::JZ,
        Operation::JNZ,
        Operation::NOP,
        Operation::CMP,
        Operation::SHL,
        Operation::SHR,
        Operation::ROL,
        Operation::ROR,
        Operation::NOT,
        Operation::MOV,
    ];

    pub fn mnemonic(self) -> &'static str {
        use Operation::*;

        match self {
            ADD => "add",
            SUB => "sub",
            MUL => "mul",
            DIV => "div",
            PUSH => "push",
            PUSHF => "pushf",
            PUSHA => "pusha",
            POP => "pop",
            POPF => "popf",
            POPA => "popa",
            AND => "and",
            OR => "or",
            XOR => "xor",
            INC => "inc",
            DEC => "dec",
            JMP => "jmp",
            JA => "ja",
            JB => "jb",
            JE => "je",
            JNE => "jne",
            JZ => "jz",
            JNZ => "jnz",
            NOP => "nop",
            CMP => "cmp",
            SHL => "shl",
            SHR => "shr",
            ROL => "rol",
            ROR => "ror",
            NOT => "not",
            MOV => "mov",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

impl std::str::FromStr for Operation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|operation| operation.mnemonic() == lower)
            .ok_or(())
    }
}
