use super::*;
use crate::memory::{Access, MemoryEvent};
use mtc_instruction::RegisterName::*;
use mtc_instruction::{DecodeError, OperandKind};
use std::cell::RefCell;
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn processor(source: &str) -> Processor {
    init_tracing();

    let program = mtc_assembler::load(source).unwrap();
    let mut processor = Processor::default();
    processor.load(program.image(), program.entry()).unwrap();
    processor
}

fn run(processor: &mut Processor, steps: usize) {
    for _ in 0..steps {
        processor.step().unwrap();
    }
}

macro_rules! assert_register {
    ($processor:expr, $name:ident, $value:expr) => {{
        assert_eq!(
            $value,
            $processor.register($name).value(),
            "register {}",
            stringify!($name)
        );
    }};
}

#[test]
fn initial_state() {
    let processor = Processor::default();
    assert_register!(processor, IP, 0);
    assert_register!(processor, SP, 1023);
    assert_register!(processor, A, 0);
    assert_eq!(None, processor.last_instruction());

    let processor = Processor::with_capacity(16).unwrap();
    assert_register!(processor, SP, 15);

    assert!(matches!(
        Processor::with_capacity(0),
        Err(Error::InvalidCapacity(0))
    ));
}

#[test]
fn mov_between_registers() {
    let mut processor = processor("mov a, b\nmov c, a\nmov d, c");
    processor.register_mut(B).set_value(42);

    processor.step().unwrap();
    assert_register!(processor, A, 42);
    assert_register!(processor, IP, 3);

    processor.step().unwrap();
    assert_register!(processor, C, 42);
    assert_register!(processor, IP, 6);

    processor.step().unwrap();
    assert_register!(processor, D, 42);
    assert_register!(processor, IP, 9);
}

#[test]
fn data_and_labels() {
    let mut processor = processor("VAL DW 7\nstart:\nmov a, val\nadd a, 1\njmp start");
    assert_register!(processor, IP, 1);

    run(&mut processor, 2);
    assert_register!(processor, A, 8);
    assert!(!processor.flags().contains(Flags::ZERO));

    processor.step().unwrap();
    assert_register!(processor, IP, 1);

    run(&mut processor, 2);
    assert_register!(processor, A, 8);
}

#[test]
fn store_to_data() {
    let mut processor = processor("val dw 7\nadd val, 3\ninc val");
    run(&mut processor, 2);
    assert_eq!(11, processor.memory().cells()[0]);
}

#[test]
fn indirect_operands() {
    let mut processor =
        processor("ptr dw 3\nx dw 0\ny dw 0\nval dw 9\nmov a, [ptr]\nmov [ptr], 1\nmov b, val");

    processor.step().unwrap();
    assert_register!(processor, A, 9);

    run(&mut processor, 2);
    assert_register!(processor, B, 1);
    assert_eq!(&[3, 0, 0, 1], &processor.memory().cells()[..4]);
}

#[test]
fn stack_discipline() {
    let mut processor = processor("mov a, 3\npush a\npop b");

    run(&mut processor, 2);
    assert_register!(processor, SP, 1022);
    assert_eq!(3, processor.memory().cells()[1022]);

    processor.step().unwrap();
    assert_register!(processor, B, 3);
    assert_register!(processor, SP, 1023);
}

#[test]
fn push_and_pop_flags() {
    let mut processor = processor("sub a, 1\npushf\nadd a, 1\npopf");

    run(&mut processor, 3);
    assert!(processor.flags().contains(Flags::ZERO));

    processor.step().unwrap();
    let flags = processor.flags();
    assert!(flags.contains(Flags::SIGN | Flags::CARRY));
    assert!(!flags.contains(Flags::ZERO));
    assert_register!(processor, SP, 1023);
}

#[test]
fn push_and_pop_all() {
    let mut processor = processor("pusha\nmov a, 0\nmov bp, 0\nmov di, 0\npopa");
    for (name, value) in [(A, 1), (B, 2), (C, 3), (D, 4), (BP, 5), (SI, 6), (DI, 7)] {
        processor.register_mut(name).set_value(value);
    }

    processor.step().unwrap();
    assert_register!(processor, SP, 1015);
    assert_eq!(
        &[7, 6, 5, 1023, 4, 3, 2, 1],
        &processor.memory().cells()[1015..1023]
    );

    run(&mut processor, 4);
    for (name, value) in [(A, 1), (B, 2), (C, 3), (D, 4), (BP, 5), (SI, 6), (DI, 7)] {
        assert_eq!(value, processor.register(name).value(), "{}", name);
    }
    assert_register!(processor, SP, 1023);
}

#[test]
fn multiply() {
    let mut processor = processor("mov a, 6\nmul 7\nmov b, 0x100\nmov a, 0x100\nmul b");

    run(&mut processor, 2);
    assert_register!(processor, A, 42);
    assert!(!processor.flags().contains(Flags::CARRY));

    run(&mut processor, 3);
    assert_register!(processor, A, 0);
    assert!(processor.flags().contains(Flags::CARRY));
}

#[test]
fn divide() {
    let mut processor = processor("mov a, 10\nmov b, 3\ndiv b");
    run(&mut processor, 3);

    assert_eq!(3, processor.register(A).low());
    assert_eq!(1, processor.register(A).high());
}

#[test]
fn divide_by_zero() {
    let mut processor = processor("mov a, 10\ndiv 0");
    processor.step().unwrap();

    assert_eq!(Err(Error::DivideByZero), processor.step());
    assert_register!(processor, A, 10);
    assert_register!(processor, IP, 3);
}

#[test]
fn compare_does_not_store() {
    let mut processor = processor("mov a, 5\ncmp a, 5\ncmp a, 6");

    run(&mut processor, 2);
    assert_register!(processor, A, 5);
    assert!(processor.flags().contains(Flags::ZERO));

    processor.step().unwrap();
    assert!(processor.flags().contains(Flags::CARRY | Flags::SIGN));
    assert!(!processor.flags().contains(Flags::ZERO));
}

#[test]
fn logic() {
    let mut processor = processor(concat!(
        "mov a, 0x0F0F\nand a, 0x00FF\n",
        "or a, 0xF000\nxor a, 0xF00F\nnot a",
    ));

    run(&mut processor, 2);
    assert_register!(processor, A, 0x000F);

    processor.step().unwrap();
    assert_register!(processor, A, 0xF00F);

    processor.step().unwrap();
    assert_register!(processor, A, 0);
    assert!(processor.flags().contains(Flags::ZERO | Flags::PARITY));

    processor.step().unwrap();
    assert_register!(processor, A, 0xFFFF);
    assert!(processor.flags().contains(Flags::SIGN));
}

#[test]
fn sign_after_decrement() {
    let mut processor = processor("dec a\ninc a");

    processor.step().unwrap();
    assert_register!(processor, A, 0xFFFF);
    assert!(processor.flags().contains(Flags::SIGN | Flags::PARITY));

    processor.step().unwrap();
    assert_register!(processor, A, 0);
    assert!(processor.flags().contains(Flags::ZERO));
    assert!(!processor.flags().contains(Flags::SIGN));
}

#[test]
fn shifts_and_rotates() {
    let mut processor =
        processor("mov a, 0x8001\nshl a, 1\nshr a, 1\nmov b, 0x8001\nrol b, 4\nror b, 8");

    run(&mut processor, 2);
    assert_register!(processor, A, 0x0002);
    assert!(processor.flags().contains(Flags::CARRY));

    processor.step().unwrap();
    assert_register!(processor, A, 0x0001);
    assert!(!processor.flags().contains(Flags::CARRY));

    run(&mut processor, 2);
    assert_register!(processor, B, 0x0018);

    processor.step().unwrap();
    assert_register!(processor, B, 0x1800);
}

#[test]
fn conditional_jumps() {
    let mut processor = processor("mov a, 1\nsub a, 1\njz done\nmov b, 1\ndone:\nmov c, 2");

    run(&mut processor, 3);
    assert_register!(processor, IP, 11);

    processor.step().unwrap();
    assert_register!(processor, B, 0);
    assert_register!(processor, C, 2);
}

#[test]
fn jump_not_taken_skips_operand() {
    let mut processor = processor("mov a, 1\njz 0\njne next\nnop\nnext:\nnop");

    run(&mut processor, 2);
    assert_register!(processor, IP, 5);

    processor.step().unwrap();
    assert_register!(processor, IP, 8);
}

#[test]
fn above_and_below() {
    let mut processor = processor(concat!(
        "mov a, 1\ncmp a, 2\njb less\nnop\n",
        "less:\ncmp a, 0\nja more\nnop\n",
        "more:\nnop",
    ));

    run(&mut processor, 3);
    assert_register!(processor, IP, 9);

    run(&mut processor, 2);
    assert_register!(processor, IP, 15);
}

#[test]
fn jump_wraps_into_memory() {
    let program = mtc_assembler::load("jmp 20").unwrap();
    let mut processor = Processor::with_capacity(16).unwrap();
    processor.load(program.image(), program.entry()).unwrap();

    processor.step().unwrap();
    assert_register!(processor, IP, 4);
}

#[test]
fn image_larger_than_memory_is_rejected() {
    let mut processor = Processor::with_capacity(4).unwrap();

    assert_eq!(
        Err(Error::ProgramTooLarge {
            len: 6,
            capacity: 4
        }),
        processor.load(&[7, 1, 2, 3, 4, 5], 0)
    );
    assert_eq!(0, processor.memory().get_word(0));
    assert_eq!(0, processor.memory().get_word(1));

    processor.load(&[7, 1, 2, 3], 0).unwrap();
    assert_eq!(3, processor.memory().get_word(3));
}

#[test]
fn invalid_op_code() {
    let mut processor = Processor::default();
    processor.load(&[500], 0).unwrap();

    assert_eq!(
        Err(Error::Decode(DecodeError::InvalidOpCode(500))),
        processor.step()
    );
}

#[test]
fn invalid_register_operand() {
    let mov = InstructionCatalog::get()
        .lookup("mov", Some(OperandKind::Register), Some(OperandKind::Register))
        .unwrap();

    let mut processor = Processor::default();
    processor.load(&[mov, 99, 0], 0).unwrap();

    assert_eq!(
        Err(Error::InvalidLocation {
            kind: OperandKind::Register,
            word: 99
        }),
        processor.step()
    );
    assert_register!(processor, IP, 0);
}

#[test]
fn store_to_immediate_changes_nothing() {
    let mut processor = processor("mov a, 7\npush a\npop 5");
    run(&mut processor, 2);

    assert_eq!(
        Err(Error::InvalidLocation {
            kind: OperandKind::Immediate,
            word: 5
        }),
        processor.step()
    );
    assert_register!(processor, SP, 1022);
    assert_register!(processor, IP, 5);
}

#[test]
fn retrieve_and_store() {
    let mut processor = Processor::default();

    processor.store(OperandKind::Register, 2, 0x55).unwrap();
    assert_register!(processor, C, 0x55);

    processor.store(OperandKind::Direct, 10, 20).unwrap();
    processor.store(OperandKind::Indirect, 10, 7).unwrap();
    assert_eq!(7, processor.retrieve(OperandKind::Direct, 20).unwrap());
    assert_eq!(7, processor.retrieve(OperandKind::Indirect, 10).unwrap());
    assert_eq!(9, processor.retrieve(OperandKind::Immediate, 9).unwrap());

    assert!(matches!(
        processor.store(OperandKind::Immediate, 9, 1),
        Err(Error::InvalidLocation { .. })
    ));
    assert!(matches!(
        processor.retrieve(OperandKind::Register, 16),
        Err(Error::InvalidLocation { .. })
    ));
}

#[test]
fn listeners() {
    let mut processor = processor("x dw 0\npush 7\nmov x, 1");

    let pointers = Rc::new(RefCell::new(vec![]));
    let stores = Rc::new(RefCell::new(vec![]));
    {
        let pointers = Rc::clone(&pointers);
        processor.add_listener(move |event| pointers.borrow_mut().push(*event));

        let stores = Rc::clone(&stores);
        processor.memory_mut().add_listener(move |event: &MemoryEvent| {
            if event.access == Access::Store {
                stores.borrow_mut().push((event.address, event.value));
            }
        });
    }

    run(&mut processor, 2);

    assert_eq!(
        vec![
            PointerEvent {
                register: SP,
                address: 1022
            },
            PointerEvent {
                register: IP,
                address: 3
            },
            PointerEvent {
                register: IP,
                address: 6
            },
        ],
        *pointers.borrow()
    );
    assert_eq!(vec![(1022, 7), (0, 1)], *stores.borrow());
}

#[test]
fn illegal_instruction_is_reported() {
    assert_eq!(
        "Illegal instruction! (nop)",
        Error::IllegalInstruction(InstructionCatalog::get().decode(114).unwrap()).to_string()
    );
}

#[test]
fn readout() {
    let mut processor = processor("mov a, 0x0a\ncmp a, 0x0a");
    run(&mut processor, 2);

    assert_eq!(
        Some("cmp reg, imm".to_string()),
        processor.last_instruction().map(|entry| entry.to_string())
    );

    let line = processor.to_string();
    assert!(line.starts_with("A:000A B:0000"), "{}", line);
    assert!(line.contains("SP:03FF"), "{}", line);
    assert!(line.ends_with("FL:-P-Z--"), "{}", line);

    let line = processor.readout(Radix::Decimal);
    assert!(line.starts_with("A:10 B:0"), "{}", line);
}
