#![allow(dead_code)]

use wtg::{Category, Document, Function, Parameter, Trigger, TriggerData, Variable, Version};

/// Excerpt of the game's function table covering everything the fixtures use
pub const TRIGGER_DATA: &str = "\
// Excerpt of UI/TriggerData.txt

[TriggerTypes]
integer=0,1,1,WESTRING_TRIGTYPE_integer

[TriggerEvents]
_MapInitializationEvent_Category=TC_MAP
MapInitializationEvent=0,nothing
TriggerRegisterTimerEventPeriodic=0,real

[TriggerConditions]
OperatorCompareBoolean=0,boolean,EqualNotEqualOperator,boolean
OperatorCompareInteger=0,integer,ComparisonOperator,integer

[TriggerActions]
DoNothing=0,nothing
SetVariable=0,AnyGlobal,VarAsString_Real
IfThenElseMultiple=1,nothing
DisplayTextToForce=0,force,StringExt

[TriggerCalls]
GetPlayersAll=0,0,force,nothing
OperatorInt=0,0,integer,integer,ArithmeticOperator,integer
";

pub fn trigger_data() -> TriggerData {
    TriggerData::from_text(TRIGGER_DATA.as_bytes()).unwrap()
}

/// Three variables, one category, and two triggers where the second nests an
/// if / then / else block with calls in its branches
pub fn document() -> Document {
    let mut doc = Document::new(Version::TFT);
    doc.push_category(Category::new(0, "Initialization"));
    doc.insert_variable(Variable::new("count", "integer").initial("0"));
    doc.insert_variable(Variable::new("names", "string").array(2));
    doc.insert_variable(Variable::new("ready", "boolean").initial("false"));

    doc.push_trigger(
        Trigger::new("Setup", 0)
            .with_function(Function::event("MapInitializationEvent"))
            .with_function(
                Function::action("SetVariable")
                    .with_param(Parameter::variable("count"))
                    .with_param(Parameter::string("5")),
            )
            .with_function(
                Function::action("SetVariable")
                    .with_param(Parameter::indexed("names", Parameter::string("1")))
                    .with_param(Parameter::string("hello")),
            ),
    );

    let mut tick = Trigger::new("Tick", 0)
        .with_function(
            Function::event("TriggerRegisterTimerEventPeriodic")
                .with_param(Parameter::string("1.00")),
        )
        .with_function(
            Function::action("IfThenElseMultiple")
                .with_child(
                    Function::BRANCH_CONDITION,
                    Function::condition("OperatorCompareBoolean")
                        .with_param(Parameter::variable("ready"))
                        .with_param(Parameter::preset("OperatorEqualENE"))
                        .with_param(Parameter::preset("true")),
                )
                .with_child(
                    Function::BRANCH_THEN,
                    Function::action("DisplayTextToForce")
                        .with_param(Parameter::call(Function::call("GetPlayersAll")))
                        .with_param(Parameter::string("ready")),
                )
                .with_child(
                    Function::BRANCH_ELSE,
                    Function::action("SetVariable")
                        .with_param(Parameter::variable("count"))
                        .with_param(Parameter::call(
                            Function::call("OperatorInt")
                                .with_param(Parameter::variable("count"))
                                .with_param(Parameter::preset("OperatorAdd"))
                                .with_param(Parameter::string("1")),
                        )),
                ),
        );
    tick.description = String::from("Counts until ready");
    tick.initially_on = false;
    doc.push_trigger(tick);

    doc
}

pub fn push_i32(out: &mut Vec<u8>, x: i32) {
    out.extend_from_slice(&x.to_le_bytes());
}

pub fn push_str(out: &mut Vec<u8>, x: &str) {
    out.extend_from_slice(x.as_bytes());
    out.push(0);
}
