use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Mnemonic {
    MOV,
    ADD,
    SUB,
    CMP,

    JO,
    JNO,
    JB,
    JNB,
    JZ,
    JNZ,
    JBE,
    JA,
    JS,
    JNS,
    JP,
    JNP,
    JL,
    JNL,
    JLE,
    JG,

    LOOPNZ,
    LOOPZ,
    LOOP,
    JCXZ,
}

impl Mnemonic {
    /// Conditional jumps in `0111cccc` order.
    pub const JCC: [Mnemonic; 16] = [
        Mnemonic::JO,
        Mnemonic::JNO,
        Mnemonic::JB,
        Mnemonic::JNB,
        Mnemonic::JZ,
        Mnemonic::JNZ,
        Mnemonic::JBE,
        Mnemonic::JA,
        Mnemonic::JS,
        Mnemonic::JNS,
        Mnemonic::JP,
        Mnemonic::JNP,
        Mnemonic::JL,
        Mnemonic::JNL,
        Mnemonic::JLE,
        Mnemonic::JG,
    ];

    /// Loop family in `111000cc` order.
    pub const LOOPS: [Mnemonic; 4] = [
        Mnemonic::LOOPNZ,
        Mnemonic::LOOPZ,
        Mnemonic::LOOP,
        Mnemonic::JCXZ,
    ];
}
