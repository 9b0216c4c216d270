use nom::{
    character::complete::{alphanumeric1, char, digit1, none_of},
    Finish,
    IResult,
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    branch::alt,
    bytes::complete::{tag, take_while, escaped_transform},
};
use tagwire::*;
use anyhow::{anyhow, Context, Result};
use base64::decode;

/// A literal as written in the textual representation. Integers only receive their width and
/// transform once they are matched against the schema.
#[derive(Debug, PartialEq)]
pub enum Literal {
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Int(i128),
}

impl Literal {

    fn name(&self) -> &'static str {
        match *self {
            Literal::Str(_)   => "a string",
            Literal::Bytes(_) => "bytes",
            Literal::Bool(_)  => "a bool",
            Literal::Int(_)   => "an integer",
        }
    }

    /// Turns the literal into a value of the declared type. Undeclared strings, bytes and bools
    /// keep their natural type, undeclared integers are an error.
    pub fn into_value(self, field: FieldNumber, ty: Option<FieldType>) -> Result<Value<'static>> {
        match (self, ty) {
            (Literal::Str(s), None | Some(FieldType::String))  => Ok(Value::from(s)),
            (Literal::Str(s), Some(FieldType::Bytes))          => Ok(Value::from(s.into_bytes())),
            (Literal::Bytes(b), None | Some(FieldType::Bytes)) => Ok(Value::from(b)),
            (Literal::Bool(b), None | Some(FieldType::Bool))   => Ok(Value::Bool(b)),
            (Literal::Int(_), None) => Err(anyhow!("Field {} holds an integer but its type is not declared", field)),
            (Literal::Int(i), Some(ty)) => Self::int(i, ty)
                .with_context(|| format!("Field {} is declared as {}", field, ty)),
            (literal, Some(ty)) => Err(anyhow!("Field {} is declared as {} but holds {}", field, ty, literal.name())),
        }
    }

    fn int(i: i128, ty: FieldType) -> Result<Value<'static>> {
        let out_of_range = || anyhow!("{} is out of range", i);
        match ty {
            FieldType::Uint32 => Ok(Value::Uint32(u32::try_from(i).map_err(|_| out_of_range())?)),
            FieldType::Uint64 => Ok(Value::Uint64(u64::try_from(i).map_err(|_| out_of_range())?)),
            FieldType::Sint32 => Ok(Value::Sint32(i32::try_from(i).map_err(|_| out_of_range())?)),
            FieldType::Sint64 => Ok(Value::Sint64(i64::try_from(i).map_err(|_| out_of_range())?)),
            FieldType::Int32  => Ok(Value::Int32(i32::try_from(i).map_err(|_| out_of_range())?)),
            FieldType::Int64  => Ok(Value::Int64(i64::try_from(i).map_err(|_| out_of_range())?)),
            FieldType::Bool | FieldType::String | FieldType::Bytes => Err(anyhow!("integer literal {} does not match", i)),
        }
    }

}

const WHITESPACE: &'static str = " \t\r\n";
const B64_CHARS: &'static str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn white(i: &str) -> IResult<&str, &str> {
    take_while(move |c| WHITESPACE.contains(c))(i)
}

fn field_number(i: &str) -> IResult<&str, FieldNumber> {
    map_res(digit1, |n: &str| n.parse())(i)
}

fn colon(i: &str) -> IResult<&str, char> {
    delimited(white, char(':'), white)(i)
}

fn comma(i: &str) -> IResult<&str, char> {
    delimited(white, char(','), white)(i)
}

fn int(i: &str) -> IResult<&str, i128> {
    map_res(recognize(tuple((opt(tag("-")), digit1))), |n: &str| n.parse())(i)
}

fn boolean(i: &str) -> IResult<&str, bool> {
    alt((value(true, tag("true")), value(false, tag("false"))))(i)
}

fn b64(i: &str) -> IResult<&str, &str> {
    recognize(tuple((take_while(move |c| B64_CHARS.contains(c)), opt(tag("=")), opt(tag("=")))))(i)
}

fn bytes(i: &str) -> IResult<&str, Vec<u8>> {
    map_res(preceded(tag(":"), b64), |b: &str| decode(b))(i)
}

fn string(i: &str) -> IResult<&str, String> {
    delimited(
            tag("\""),
            map(opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                        tag("\\"),
                        tag("\""),
                )))), |c| c.unwrap_or_default()),
            tag("\"")
    )(i)
}

fn literal(i: &str) -> IResult<&str, Literal> {
    alt((
        map(string, Literal::Str),
        map(bytes, Literal::Bytes),
        map(boolean, Literal::Bool),
        map(int, Literal::Int),
    ))(i)
}

fn fields(i: &str) -> IResult<&str, Vec<(FieldNumber, Literal)>> {
    terminated(separated_list0(comma, separated_pair(field_number, colon, literal)), opt(comma))(i)
}

fn record(i: &str) -> IResult<&str, Vec<(FieldNumber, Literal)>> {
    delimited(
        white,
        alt((
            delimited(tuple((char('('), white)), fields, tuple((white, char(')')))),
            fields,
        )),
        white,
    )(i)
}

fn schema_entries(i: &str) -> IResult<&str, Vec<(FieldNumber, &str)>> {
    delimited(
        white,
        terminated(separated_list0(comma, separated_pair(field_number, colon, alphanumeric1)), opt(comma)),
        white,
    )(i)
}

/// Parses a schema such as `1:string,2:sint32`
pub fn schema(i: &str) -> Result<Schema> {
    let entries = all_consuming(schema_entries)(i).finish().map_err(|e| anyhow!("{}", e))?.1;
    entries.into_iter()
        .map(|(field, name)| -> Result<(FieldNumber, FieldType)> { Ok((field, name.parse()?)) })
        .collect()
}

/// Parses a textual record such as `(1: "testing", 2: -1)`. Field types are taken from `schema`
/// where declared.
pub fn parse(i: &str, schema: &Schema) -> Result<Record> {
    let fields = all_consuming(record)(i).finish().map_err(|e| anyhow!("{}", e))?.1;
    let mut record = Record::with_schema(schema.clone());
    for (field, literal) in fields {
        let value = literal.into_value(field, schema.get(field))?;
        record.insert(field, value);
    }
    Ok(record)
}
