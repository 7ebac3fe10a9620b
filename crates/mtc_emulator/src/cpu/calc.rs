use super::Flags;

/// Set zero, sign and parity from a 16-bit result.
pub fn flags_from_value_word(value: u16, flags: &mut Flags) {
    flags.set(Flags::ZERO, value == 0);
    flags.set(Flags::SIGN, value & 0x8000 != 0);
    flags.set(Flags::PARITY, value.count_ones() % 2 == 0);
}

pub fn add(left: u16, right: u16, flags: &mut Flags) -> u16 {
    let (result, carry) = left.overflowing_add(right);

    flags_from_value_word(result, flags);
    flags.set(Flags::CARRY, carry);
    flags.set(Flags::AUX_CARRY, (left & 0xF) + (right & 0xF) > 0xF);

    result
}

pub fn sub(left: u16, right: u16, flags: &mut Flags) -> u16 {
    let (result, borrow) = left.overflowing_sub(right);

    flags_from_value_word(result, flags);
    flags.set(Flags::CARRY, borrow);
    flags.set(Flags::AUX_CARRY, (left & 0xF) < (right & 0xF));

    result
}

pub fn inc(value: u16, flags: &mut Flags) -> u16 {
    let result = value.wrapping_add(1);

    flags_from_value_word(result, flags);
    flags.set(Flags::AUX_CARRY, value & 0xF == 0xF);

    result
}

pub fn dec(value: u16, flags: &mut Flags) -> u16 {
    let result = value.wrapping_sub(1);

    flags_from_value_word(result, flags);
    flags.set(Flags::AUX_CARRY, value & 0xF == 0);

    result
}

/// Result of a bitwise operation. Carry and aux carry are always cleared.
pub fn logic(result: u16, flags: &mut Flags) -> u16 {
    flags_from_value_word(result, flags);
    flags.remove(Flags::CARRY | Flags::AUX_CARRY);

    result
}

pub fn not(value: u16, flags: &mut Flags) -> u16 {
    let result = !value;
    flags_from_value_word(result, flags);
    result
}

pub fn mul(left: u16, right: u16, flags: &mut Flags) -> u16 {
    let product = left as u32 * right as u32;
    let result = product as u16;

    flags_from_value_word(result, flags);
    flags.set(Flags::CARRY, product > 0xFFFF);

    result
}

/// Returns (quotient, remainder) or `None` for a zero divisor.
pub fn div(dividend: u16, divisor: u16, flags: &mut Flags) -> Option<(u16, u16)> {
    if divisor == 0 {
        return None;
    }

    let quotient = dividend / divisor;
    let remainder = dividend % divisor;

    flags_from_value_word(quotient, flags);

    Some((quotient, remainder))
}

pub fn shl(value: u16, count: u16, flags: &mut Flags) -> u16 {
    if count == 0 {
        return value;
    }

    let (result, carry) = if count > 16 {
        (0, false)
    } else {
        let shifted = (value as u32) << count;
        (shifted as u16, shifted & 0x1_0000 != 0)
    };

    flags.set(Flags::CARRY, carry);
    flags_from_value_word(result, flags);

    result
}

pub fn shr(value: u16, count: u16, flags: &mut Flags) -> u16 {
    if count == 0 {
        return value;
    }

    let (result, carry) = if count > 16 {
        (0, false)
    } else {
        let carry = (value as u32 >> (count - 1)) & 1 != 0;
        ((value as u32 >> count) as u16, carry)
    };

    flags.set(Flags::CARRY, carry);
    flags_from_value_word(result, flags);

    result
}

pub fn rol(value: u16, count: u16, flags: &mut Flags) -> u16 {
    let result = value.rotate_left(count as u32 % 16);
    if count != 0 {
        flags.set(Flags::CARRY, result & 0x0001 != 0);
    }
    result
}

pub fn ror(value: u16, count: u16, flags: &mut Flags) -> u16 {
    let result = value.rotate_right(count as u32 % 16);
    if count != 0 {
        flags.set(Flags::CARRY, result & 0x8000 != 0);
    }
    result
}
