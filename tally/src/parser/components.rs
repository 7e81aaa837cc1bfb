//! Component builder
//!
//! The grammar only finds raw pieces (numbers, words, symbols, groups). This
//! module turns them into `ExpressionComponent`s: numbers absorb a trailing
//! unit, currency or percent sign, adjacent words become one phrase name, a
//! bracket touching an operand becomes list access and `..` folds its
//! neighbours into a range.

use super::literals::{self, parse_decimal};
use super::{ComponentParser, Rule};
use crate::ast::{Access, ArithmeticOperation, Argument, ComponentKind, ExpressionComponent, Operator, Span};
use crate::datemath::zones;
use crate::error::{TallyError, TallyResult};
use crate::evaluator::operations;
use crate::semantic::{currency, Currency, CurrencyRate, DurationUnit, ErrorValue, Money, SemanticValue};
use crate::stores::normalize_name;
use pest::iterators::Pair;
use pest::Parser;
use std::iter::Peekable;

/// Words that are never part of a unit or a phrase name
const KEYWORDS: &[&str] = &["of", "to", "as", "in", "into", "mod", "per", "step", "and"];

#[derive(Debug, Clone)]
enum Token {
    Number,
    Currency(&'static Currency),
    Operator,
    Percent,
    Word,
    RangeOp,
    Date,
    Time,
    Group(Vec<Lexeme>),
    List(Vec<Vec<Lexeme>>),
    Slice(Vec<Lexeme>, Vec<Lexeme>),
    Call { name: String, args: Vec<RawArgument> },
}

#[derive(Debug, Clone)]
struct Lexeme {
    token: Token,
    text: String,
    span: Span,
}

impl Lexeme {
    fn is_word(&self) -> bool {
        matches!(self.token, Token::Word)
    }

    fn is_unit_word(&self) -> bool {
        self.is_word() && (!is_keyword(&self.text) || self.text.eq_ignore_ascii_case("in"))
    }

    fn is_operator(&self, symbols: &[&str]) -> bool {
        matches!(self.token, Token::Operator) && symbols.contains(&self.text.as_str())
    }
}

#[derive(Debug, Clone)]
struct RawArgument {
    name: Option<String>,
    lexemes: Vec<Lexeme>,
    text: String,
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word.to_lowercase().as_str())
}

/// Parse one expression into components
pub fn parse_components(text: &str) -> TallyResult<Vec<ExpressionComponent>> {
    check_balance(text)?;
    let pairs = ComponentParser::parse(Rule::expression, text).map_err(|e| pest_error(&e, text))?;
    let sequence = pairs
        .into_iter()
        .next()
        .and_then(|expression| expression.into_inner().find(|p| p.as_rule() == Rule::sequence))
        .ok_or_else(|| TallyError::Engine(format!("No expression found in '{}'", text)))?;
    let lexemes = lex_sequence(sequence)?;
    Builder { source: text }.build(&lexemes)
}

fn position_span(text: &str, index: usize) -> Span {
    let index = index.min(text.len());
    let width = text[index..].chars().next().map_or(0, char::len_utf8);
    Span {
        start: index,
        end: index + width,
        line: 1,
        col: text[..index].chars().count() + 1,
    }
}

fn check_balance(text: &str) -> TallyResult<()> {
    let mut open: Vec<(char, usize)> = Vec::new();
    for (index, c) in text.char_indices() {
        match c {
            '(' | '[' => open.push((c, index)),
            ')' | ']' => {
                let expected = if c == ')' { '(' } else { '[' };
                match open.pop() {
                    Some((found, _)) if found == expected => {}
                    Some((found, at)) => {
                        return Err(TallyError::parse_with_suggestion(
                            format!("'{}' is closed by '{}'", found, c),
                            position_span(text, at),
                            text,
                            format!("Close '{}' before '{}'", found, c),
                        ))
                    }
                    None => {
                        return Err(TallyError::parse_with_suggestion(
                            format!("Unexpected '{}'", c),
                            position_span(text, index),
                            text,
                            format!("Remove it or add a matching '{}'", expected),
                        ))
                    }
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some((c, at)) => Err(TallyError::parse_with_suggestion(
            format!("Unclosed '{}'", c),
            position_span(text, at),
            text,
            format!("Add a closing '{}'", if c == '(' { ')' } else { ']' }),
        )),
        None => Ok(()),
    }
}

fn pest_error(error: &pest::error::Error<Rule>, text: &str) -> TallyError {
    let index = match error.location {
        pest::error::InputLocation::Pos(p) => p,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    let span = position_span(text, index);
    let message = match text.get(index..).and_then(|rest| rest.chars().next()) {
        Some(c) => format!("Unexpected character '{}'", c),
        None => "Unexpected end of expression".to_string(),
    };
    TallyError::parse(message, span, text)
}

fn lex_sequence(pair: Pair<'_, Rule>) -> TallyResult<Vec<Lexeme>> {
    pair.into_inner().map(lex_element).collect()
}

fn lex_first_child(pair: Pair<'_, Rule>) -> TallyResult<Vec<Lexeme>> {
    match pair.into_inner().next() {
        Some(sequence) => lex_sequence(sequence),
        None => Ok(Vec::new()),
    }
}

fn lex_element(pair: Pair<'_, Rule>) -> TallyResult<Lexeme> {
    let span = Span::from_pest_span(pair.as_span());
    let text = pair.as_str().to_string();
    let token = match pair.as_rule() {
        Rule::number | Rule::plain_number => Token::Number,
        Rule::currency_symbol => Token::Currency(
            currency::by_symbol(&text)
                .ok_or_else(|| TallyError::parse(format!("Unknown currency '{}'", text), span, &text))?,
        ),
        Rule::operator => Token::Operator,
        Rule::percent => Token::Percent,
        Rule::word => Token::Word,
        Rule::range_op => Token::RangeOp,
        Rule::date_literal => Token::Date,
        Rule::time_literal => Token::Time,
        Rule::group => Token::Group(lex_first_child(pair)?),
        Rule::bracket => lex_bracket(pair)?,
        Rule::call => lex_call(pair)?,
        other => {
            return Err(TallyError::Engine(format!(
                "Unexpected grammar rule {:?} in '{}'",
                other, text
            )))
        }
    };
    Ok(Lexeme { token, text, span })
}

fn lex_bracket(pair: Pair<'_, Rule>) -> TallyResult<Token> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| TallyError::Engine("Empty bracket".to_string()))?;
    match inner.as_rule() {
        Rule::slice => {
            let mut bounds = inner.into_inner();
            let start = bounds.next().map(lex_first_child).transpose()?.unwrap_or_default();
            let end = bounds.next().map(lex_first_child).transpose()?.unwrap_or_default();
            Ok(Token::Slice(start, end))
        }
        _ => {
            let items = inner.into_inner().map(lex_sequence).collect::<TallyResult<Vec<_>>>()?;
            Ok(Token::List(items))
        }
    }
}

fn lex_call(pair: Pair<'_, Rule>) -> TallyResult<Token> {
    let mut name = String::new();
    let mut args = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::call_head => name = inner.as_str().trim_end_matches('(').to_string(),
            Rule::arguments => {
                for argument in inner.into_inner() {
                    let text = argument.as_str().trim().to_string();
                    let Some(body) = argument.into_inner().next() else {
                        continue;
                    };
                    if body.as_rule() == Rule::named_argument {
                        let mut parts = body.into_inner();
                        let arg_name = parts.next().map(|p| p.as_str().to_string());
                        let lexemes = parts.next().map(lex_sequence).transpose()?.unwrap_or_default();
                        args.push(RawArgument { name: arg_name, lexemes, text });
                    } else {
                        args.push(RawArgument { name: None, lexemes: lex_sequence(body)?, text });
                    }
                }
            }
            _ => {}
        }
    }
    Ok(Token::Call { name, args })
}

/// Intermediate item before ranges are folded
enum Item {
    Part(ExpressionComponent),
    RangeOp(Span),
    Step(Span),
}

struct Builder<'s> {
    source: &'s str,
}

impl<'s> Builder<'s> {
    fn build(&self, lexemes: &[Lexeme]) -> TallyResult<Vec<ExpressionComponent>> {
        let items = self.merge(lexemes)?;
        self.fold_ranges(items)
    }

    fn text(&self, span: Span) -> &'s str {
        self.source.get(span.start..span.end).unwrap_or("")
    }

    fn component(&self, kind: ComponentKind, first: &Lexeme, last: &Lexeme) -> ExpressionComponent {
        let span = first.span.join(&last.span);
        ExpressionComponent::new(kind, self.text(span), span)
    }

    fn error(&self, message: impl Into<String>, span: Span) -> TallyError {
        TallyError::parse(message, span, self.source)
    }

    fn merge(&self, lexemes: &[Lexeme]) -> TallyResult<Vec<Item>> {
        let mut items: Vec<Item> = Vec::new();
        let mut i = 0;
        while i < lexemes.len() {
            let lexeme = &lexemes[i];
            let (item, used) = match &lexeme.token {
                Token::Number => self.number(lexemes, i)?,
                Token::Currency(currency) => {
                    let amount = lexemes
                        .get(i + 1)
                        .filter(|next| matches!(next.token, Token::Number))
                        .and_then(|next| parse_decimal(&next.text))
                        .ok_or_else(|| {
                            TallyError::parse_with_suggestion(
                                format!("'{}' must be followed by an amount", lexeme.text),
                                lexeme.span,
                                self.source,
                                format!("Write it as {}100", lexeme.text),
                            )
                        })?;
                    self.money(lexemes, i, i + 2, Money::new(amount, *currency))
                }
                Token::Word => self.word(lexemes, i)?,
                Token::Operator => {
                    let op = Operator::from_symbol(&lexeme.text)
                        .ok_or_else(|| self.error(format!("Unknown operator '{}'", lexeme.text), lexeme.span))?;
                    (Item::Part(self.component(ComponentKind::Operator(op), lexeme, lexeme)), 1)
                }
                Token::Percent => {
                    if !ends_with_operand(&items) {
                        return Err(TallyError::parse_with_suggestion(
                            "'%' needs a value before it",
                            lexeme.span,
                            self.source,
                            "Use 'mod' for the remainder of a division",
                        ));
                    }
                    let kind = ComponentKind::Operator(Operator::Percent);
                    (Item::Part(self.component(kind, lexeme, lexeme)), 1)
                }
                Token::RangeOp => (Item::RangeOp(lexeme.span), 1),
                Token::Date => self.date(lexemes, i)?,
                Token::Time => self.time(lexemes, i)?,
                Token::Group(children) => {
                    let inner = self.build(children)?;
                    if inner.is_empty() {
                        return Err(self.error("Empty parentheses", lexeme.span));
                    }
                    (Item::Part(self.component(ComponentKind::Parentheses(inner), lexeme, lexeme)), 1)
                }
                Token::List(list) => {
                    if let Some(base) = self.attachable(&mut items, lexeme) {
                        let index = match list.as_slice() {
                            [single] if !single.is_empty() => self.build(single)?,
                            _ => return Err(self.error("An index takes exactly one value", lexeme.span)),
                        };
                        (self.access(base, Access::Index(index), lexeme), 1)
                    } else {
                        (Item::Part(self.list(list, lexeme)?), 1)
                    }
                }
                Token::Slice(start, end) => {
                    let base = self
                        .attachable(&mut items, lexeme)
                        .ok_or_else(|| self.error("A slice needs a list before it", lexeme.span))?;
                    let start = if start.is_empty() { None } else { Some(self.build(start)?) };
                    let end = if end.is_empty() { None } else { Some(self.build(end)?) };
                    (self.access(base, Access::Slice { start, end }, lexeme), 1)
                }
                Token::Call { name, args } => {
                    let args = self.arguments(args, lexeme)?;
                    let kind = ComponentKind::Function { name: normalize_name(name), args };
                    (Item::Part(self.component(kind, lexeme, lexeme)), 1)
                }
            };
            items.push(item);
            i += used;
        }
        Ok(items)
    }

    /// Pop the previous operand if `lexeme` is written directly against it
    fn attachable(&self, items: &mut Vec<Item>, lexeme: &Lexeme) -> Option<ExpressionComponent> {
        match items.last() {
            Some(Item::Part(previous)) if !previous.is_operator() && previous.span.touches(&lexeme.span) => {
                match items.pop() {
                    Some(Item::Part(previous)) => Some(previous),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn access(&self, base: ExpressionComponent, access: Access, lexeme: &Lexeme) -> Item {
        let span = base.span.join(&lexeme.span);
        let kind = ComponentKind::ListAccess { base: Box::new(base), access };
        Item::Part(ExpressionComponent::new(kind, self.text(span), span))
    }

    fn list(&self, list: &[Vec<Lexeme>], lexeme: &Lexeme) -> TallyResult<ExpressionComponent> {
        let items = match list {
            [single] if single.is_empty() => Vec::new(),
            _ => list
                .iter()
                .map(|item| {
                    if item.is_empty() {
                        Err(self.error("Empty list item", lexeme.span))
                    } else {
                        self.build(item)
                    }
                })
                .collect::<TallyResult<Vec<_>>>()?,
        };
        Ok(self.component(ComponentKind::List(items), lexeme, lexeme))
    }

    fn arguments(&self, args: &[RawArgument], call: &Lexeme) -> TallyResult<Vec<Argument>> {
        if let [only] = args {
            if only.name.is_none() && only.lexemes.is_empty() {
                return Ok(Vec::new());
            }
        }
        args.iter()
            .map(|arg| {
                if arg.lexemes.is_empty() {
                    return Err(TallyError::parse_with_suggestion(
                        "Empty argument",
                        call.span,
                        self.source,
                        "Remove the extra comma",
                    ));
                }
                Ok(Argument {
                    name: arg.name.as_deref().map(normalize_name),
                    components: self.build(&arg.lexemes)?,
                    text: arg.text.clone(),
                })
            })
            .collect()
    }

    fn number(&self, lexemes: &[Lexeme], i: usize) -> TallyResult<(Item, usize)> {
        let lexeme = &lexemes[i];
        let Some(amount) = parse_decimal(&lexeme.text) else {
            return Ok(self.out_of_range(lexemes, i));
        };
        match lexemes.get(i + 1) {
            Some(Lexeme { token: Token::Currency(currency), .. }) => {
                return Ok(self.money(lexemes, i, i + 2, Money::new(amount, *currency)));
            }
            Some(next) if next.is_word() && next.text.chars().count() == 3 => {
                if let Some(currency) = currency::by_code(&next.text) {
                    return Ok(self.money(lexemes, i, i + 2, Money::new(amount, currency)));
                }
            }
            Some(next) if matches!(next.token, Token::Percent) => {
                let kind = ComponentKind::Literal(Some(SemanticValue::Percentage(amount)));
                return Ok((Item::Part(self.component(kind, lexeme, next)), 2));
            }
            _ => {}
        }
        if let Some((value, end)) = self.unit_literal(lexemes, i) {
            let kind = ComponentKind::Literal(Some(value));
            return Ok((Item::Part(self.component(kind, lexeme, &lexemes[end - 1])), end - i));
        }
        let kind = ComponentKind::Literal(Some(SemanticValue::Number(amount)));
        Ok((Item::Part(self.component(kind, lexeme, lexeme)), 1))
    }

    /// A number token too large or too precise for a Decimal. It becomes an
    /// error literal, taking any unit written after it along.
    fn out_of_range(&self, lexemes: &[Lexeme], i: usize) -> (Item, usize) {
        let lexeme = &lexemes[i];
        let end = unit_candidates(lexemes, i + 1)
            .into_iter()
            .rev()
            .find(|(_, unit_text)| {
                matches!(
                    literals::parse_value(&format!("1 {}", unit_text)),
                    Some(SemanticValue::Unit(_) | SemanticValue::Duration(_))
                )
            })
            .map_or(i + 1, |(end, _)| end);
        let error = ErrorValue::runtime(format!("Number '{}' is out of range", lexeme.text)).with_suggestion(
            "Numbers hold 28 significant digits, from about 1e-28 up to 7.9e28; use a larger or smaller unit",
        );
        let kind = ComponentKind::Literal(Some(SemanticValue::Error(error)));
        (Item::Part(self.component(kind, lexeme, &lexemes[end - 1])), end - i)
    }

    /// Money, or a rate when `/` or `per` and a unit follow
    fn money(&self, lexemes: &[Lexeme], first: usize, end: usize, money: Money) -> (Item, usize) {
        let separated = lexemes
            .get(end)
            .is_some_and(|sep| sep.is_operator(&["/", "÷"]) || sep.is_word() && sep.text.eq_ignore_ascii_case("per"));
        if separated {
            for (stop, unit_text) in unit_candidates(lexemes, end + 1).into_iter().rev() {
                if let Some(unit) = literals::rate_unit(&format!("/{}", unit_text)) {
                    let rate = CurrencyRate::new(money.amount, money.currency, unit);
                    let kind = ComponentKind::Literal(Some(SemanticValue::CurrencyUnit(rate)));
                    return (
                        Item::Part(self.component(kind, &lexemes[first], &lexemes[stop - 1])),
                        stop - first,
                    );
                }
            }
        }
        let kind = ComponentKind::Literal(Some(SemanticValue::Currency(money)));
        (Item::Part(self.component(kind, &lexemes[first], &lexemes[end - 1])), end - first)
    }

    /// Longest run of unit text after the number at `i` that reads as a quantity
    fn unit_literal(&self, lexemes: &[Lexeme], i: usize) -> Option<(SemanticValue, usize)> {
        let number = &lexemes[i].text;
        unit_candidates(lexemes, i + 1)
            .into_iter()
            .rev()
            .find_map(|(end, unit_text)| {
                match literals::parse_value(&format!("{} {}", number, unit_text))? {
                    value @ (SemanticValue::Unit(_) | SemanticValue::Duration(_)) => Some((value, end)),
                    _ => None,
                }
            })
    }

    fn word(&self, lexemes: &[Lexeme], i: usize) -> TallyResult<(Item, usize)> {
        let lexeme = &lexemes[i];
        let operator = |op: Operator| Item::Part(self.component(ComponentKind::Operator(op), lexeme, lexeme));
        match lexeme.text.to_lowercase().as_str() {
            "mod" => return Ok((operator(Operator::Binary(ArithmeticOperation::Modulo)), 1)),
            "per" => return Ok((operator(Operator::Binary(ArithmeticOperation::Divide)), 1)),
            "of" => return Ok((operator(Operator::Of), 1)),
            "step" => return Ok((Item::Step(lexeme.span), 1)),
            _ => {}
        }
        if lexeme.text.chars().count() == 3 {
            if let (Some(currency), Some(next)) = (currency::by_code(&lexeme.text), lexemes.get(i + 1)) {
                if let (Token::Number, Some(amount)) = (&next.token, parse_decimal(&next.text)) {
                    return Ok(self.money(lexemes, i, i + 2, Money::new(amount, currency)));
                }
            }
        }

        // Adjacent words form one name; `of` joins two words into the phrase
        let mut end = i + 1;
        while let Some(next) = lexemes.get(end) {
            if next.is_word() && !is_keyword(&next.text) {
                end += 1;
            } else if next.is_word()
                && next.text.eq_ignore_ascii_case("of")
                && lexemes.get(end + 1).is_some_and(|after| after.is_word() && !is_keyword(&after.text))
            {
                end += 2;
            } else {
                break;
            }
        }
        let words: Vec<&str> = lexemes[i..end].iter().map(|l| l.text.as_str()).collect();
        let kind = ComponentKind::Variable(normalize_name(&words.join(" ")));
        Ok((Item::Part(self.component(kind, lexeme, &lexemes[end - 1])), end - i))
    }

    fn date(&self, lexemes: &[Lexeme], i: usize) -> TallyResult<(Item, usize)> {
        let mut end = i + 1;
        if lexemes.get(end).is_some_and(|l| matches!(l.token, Token::Time)) {
            end += 1;
            end = zone_end(lexemes, end);
        }
        self.parsed_literal(lexemes, i, end, "date")
    }

    fn time(&self, lexemes: &[Lexeme], i: usize) -> TallyResult<(Item, usize)> {
        let end = zone_end(lexemes, i + 1);
        self.parsed_literal(lexemes, i, end, "time")
    }

    fn parsed_literal(&self, lexemes: &[Lexeme], first: usize, end: usize, what: &str) -> TallyResult<(Item, usize)> {
        let component = self.component(ComponentKind::Literal(None), &lexemes[first], &lexemes[end - 1]);
        match literals::parse_value(&component.text) {
            Some(value @ (SemanticValue::Date(_) | SemanticValue::Time(_))) => {
                let kind = ComponentKind::Literal(Some(value));
                Ok((Item::Part(ExpressionComponent::new(kind, component.text, component.span)), end - first))
            }
            _ => Err(self.error(format!("Invalid {} '{}'", what, component.text), component.span)),
        }
    }

    fn fold_ranges(&self, items: Vec<Item>) -> TallyResult<Vec<ExpressionComponent>> {
        let mut out: Vec<ExpressionComponent> = Vec::new();
        let mut items = items.into_iter().peekable();
        while let Some(item) = items.next() {
            match item {
                Item::Part(component) => out.push(component),
                Item::RangeOp(span) => {
                    let start = self.range_start(&mut out, span)?;
                    let end = self.range_operand(&mut items, span)?;
                    let step = match items.peek() {
                        Some(Item::Step(step_span)) => {
                            let step_span = *step_span;
                            items.next();
                            Some(Box::new(self.range_operand(&mut items, step_span)?))
                        }
                        _ => None,
                    };
                    let last = step.as_deref().map_or(end.span, |s| s.span);
                    let whole = start.span.join(&last);
                    let kind = ComponentKind::Range {
                        start: Box::new(start),
                        end: Box::new(end),
                        step,
                    };
                    out.push(ExpressionComponent::new(kind, self.text(whole), whole));
                }
                Item::Step(span) => {
                    return Err(TallyError::parse_with_suggestion(
                        "'step' needs a range before it",
                        span,
                        self.source,
                        "Write a range like 1..10 step 2",
                    ))
                }
            }
        }
        Ok(out)
    }

    fn range_start(&self, out: &mut Vec<ExpressionComponent>, span: Span) -> TallyResult<ExpressionComponent> {
        let start = match out.pop() {
            Some(c) if !c.is_operator() => c,
            _ => return Err(self.error("A range needs a start value before '..'", span)),
        };
        let unary = out.last().is_some_and(is_minus)
            && (out.len() == 1 || out.get(out.len() - 2).is_some_and(|c| c.is_operator()));
        match out.pop() {
            Some(minus) if unary => Ok(self.negated(minus, start)),
            Some(other) => {
                out.push(other);
                Ok(start)
            }
            None => Ok(start),
        }
    }

    fn range_operand(
        &self,
        items: &mut Peekable<impl Iterator<Item = Item>>,
        span: Span,
    ) -> TallyResult<ExpressionComponent> {
        let missing = || self.error("Range bound is missing", span);
        match items.next() {
            Some(Item::Part(minus)) if is_minus(&minus) => match items.next() {
                Some(Item::Part(operand)) if !operand.is_operator() => Ok(self.negated(minus, operand)),
                _ => Err(missing()),
            },
            Some(Item::Part(operand)) if !operand.is_operator() => Ok(operand),
            _ => Err(missing()),
        }
    }

    /// Fold a unary minus into its operand
    fn negated(&self, minus: ExpressionComponent, operand: ExpressionComponent) -> ExpressionComponent {
        let span = minus.span.join(&operand.span);
        let text = self.text(span);
        match operand.kind {
            ComponentKind::Literal(Some(value)) => {
                ExpressionComponent::new(ComponentKind::Literal(Some(operations::negate(&value))), text, span)
            }
            _ => ExpressionComponent::new(ComponentKind::Parentheses(vec![minus, operand]), text, span),
        }
    }
}

fn is_minus(component: &ExpressionComponent) -> bool {
    component.operator() == Some(Operator::Binary(ArithmeticOperation::Subtract))
}

fn ends_with_operand(items: &[Item]) -> bool {
    matches!(items.last(), Some(Item::Part(c)) if !c.is_operator())
}

/// Include a zone written after a time: `14:30 UTC`, `14:30 +05:30`
fn zone_end(lexemes: &[Lexeme], end: usize) -> usize {
    match (lexemes.get(end), lexemes.get(end + 1)) {
        (Some(word), _) if word.is_word() && zones::parse_zone(&word.text).is_some() => end + 1,
        (Some(sign), Some(offset))
            if sign.is_operator(&["+", "-"]) && matches!(offset.token, Token::Time) =>
        {
            end + 2
        }
        _ => end,
    }
}

/// Every prefix of the unit text starting at `start` that ends on a complete unit,
/// paired with the lexeme index just past it. Shortest first.
fn unit_candidates(lexemes: &[Lexeme], start: usize) -> Vec<(usize, String)> {
    let mut candidates = Vec::new();
    let mut text = String::new();
    let mut j = start;
    let mut expecting_word = true;
    let mut last_word = String::new();
    let followed_by_word = |k: usize| lexemes.get(k).is_some_and(Lexeme::is_unit_word);

    while let Some(lexeme) = lexemes.get(j) {
        if expecting_word {
            if !lexeme.is_unit_word() {
                break;
            }
            if !text.is_empty() && !text.ends_with(['/', '*']) {
                text.push(' ');
            }
            text.push_str(&lexeme.text);
            last_word = lexeme.text.to_lowercase();
            j += 1;
            expecting_word = false;
            candidates.push((j, text.clone()));
            continue;
        }

        if lexeme.is_operator(&["^", "**"]) {
            let (sign, number_at) = match lexemes.get(j + 1) {
                Some(minus) if minus.is_operator(&["-", "−"]) => ("-", j + 2),
                _ => ("", j + 1),
            };
            match lexemes.get(number_at) {
                Some(exponent) if matches!(exponent.token, Token::Number) => {
                    text.push('^');
                    text.push_str(sign);
                    text.push_str(&exponent.text);
                    j = number_at + 1;
                    candidates.push((j, text.clone()));
                }
                _ => break,
            }
        } else if (lexeme.is_operator(&["/", "÷"]) || lexeme.is_word() && lexeme.text.eq_ignore_ascii_case("per"))
            && followed_by_word(j + 1)
        {
            text.push('/');
            j += 1;
            expecting_word = true;
        } else if lexeme.is_operator(&["*", "·", "×"]) && followed_by_word(j + 1) {
            text.push('*');
            j += 1;
            expecting_word = true;
        } else if lexeme.is_word() && lexeme.text.eq_ignore_ascii_case("and") && DurationUnit::parse(&last_word).is_some() {
            text.push_str(" and");
            last_word = "and".to_string();
            j += 1;
        } else if matches!(lexeme.token, Token::Number)
            && (last_word == "and" || DurationUnit::parse(&last_word).is_some())
            && followed_by_word(j + 1)
        {
            text.push(' ');
            text.push_str(&lexeme.text);
            j += 1;
            expecting_word = true;
        } else if lexeme.is_unit_word() {
            expecting_word = true;
        } else {
            break;
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::ValueType;

    fn kinds(text: &str) -> Vec<String> {
        parse_components(text)
            .unwrap()
            .iter()
            .map(|c| match &c.kind {
                ComponentKind::Literal(Some(v)) => format!("{}:{}", v.value_type(), c.text),
                ComponentKind::Literal(None) => format!("text:{}", c.text),
                ComponentKind::Variable(name) => format!("var:{}", name),
                ComponentKind::Operator(_) => format!("op:{}", c.text),
                ComponentKind::Function { name, args } => format!("fn:{}/{}", name, args.len()),
                ComponentKind::Parentheses(_) => "group".to_string(),
                ComponentKind::List(items) => format!("list/{}", items.len()),
                ComponentKind::ListAccess { .. } => format!("access:{}", c.text),
                ComponentKind::Range { .. } => format!("range:{}", c.text),
            })
            .collect()
    }

    #[test]
    fn percentage_of() {
        assert_eq!(kinds("20% of 100"), ["percentage:20%", "op:of", "number:100"]);
    }

    #[test]
    fn rate_literal_and_area() {
        assert_eq!(
            kinds("$100/m^2 * 5 m^2"),
            ["currency rate:$100/m^2", "op:*", "unit:5 m^2"]
        );
    }

    #[test]
    fn money_forms() {
        assert_eq!(kinds("100 USD + €5"), ["currency:100 USD", "op:+", "currency:€5"]);
        assert_eq!(kinds("EUR 20"), ["currency:EUR 20"]);
    }

    #[test]
    fn compound_duration_and_units() {
        assert_eq!(kinds("2 hours 30 minutes"), ["duration:2 hours 30 minutes"]);
        assert_eq!(kinds("50 m + 20 ft"), ["unit:50 m", "op:+", "unit:20 ft"]);
        assert_eq!(kinds("60 km per h"), ["unit:60 km per h"]);
    }

    #[test]
    fn phrases_and_keywords() {
        assert_eq!(kinds("Net Price * 2"), ["var:net price", "op:*", "number:2"]);
        assert_eq!(kinds("cost of living mod 7"), ["var:cost of living", "op:mod", "number:7"]);
        assert_eq!(kinds("3 apples"), ["number:3", "var:apples"]);
    }

    #[test]
    fn list_access_requires_touching() {
        assert_eq!(kinds("xs[0]"), ["access:xs[0]"]);
        assert_eq!(kinds("xs[1:3]"), ["access:xs[1:3]"]);
        assert_eq!(kinds("xs [0]"), ["var:xs", "list/1"]);
        assert!(parse_components("[1:2]").is_err());
    }

    #[test]
    fn ranges_with_step_and_negative_bounds() {
        assert_eq!(kinds("1..10 step 3"), ["range:1..10 step 3"]);
        assert_eq!(kinds("-3..3"), ["range:-3..3"]);
        assert_eq!(kinds("1 + -3..-1"), ["number:1", "op:+", "range:-3..-1"]);
    }

    #[test]
    fn function_arguments() {
        assert_eq!(kinds("round(x, digits: 2)"), ["fn:round/2"]);
        assert_eq!(kinds("today()"), ["fn:today/0"]);
        assert!(parse_components("max(1,,2)").is_err());
    }

    #[test]
    fn dates_and_times() {
        let components = parse_components("2024-03-15 14:30 UTC + 2 hours").unwrap();
        assert!(matches!(
            &components[0].kind,
            ComponentKind::Literal(Some(v)) if v.value_type() == ValueType::Date
        ));
        assert_eq!(kinds("3pm"), ["time:3pm"]);
    }

    #[test]
    fn unbalanced_brackets_are_reported() {
        let err = parse_components("(1 + 2").unwrap_err();
        assert!(err.message().contains("Unclosed '('"));
        let err = parse_components("1 + 2)").unwrap_err();
        assert!(err.message().contains("Unexpected ')'"));
        assert!(parse_components("()").is_err());
    }

    #[test]
    fn stray_percent_is_rejected() {
        assert!(parse_components("% 5").is_err());
        assert_eq!(kinds("x%"), ["var:x", "op:%"]);
    }
}
